use crate::config::ProgressMode;
use chrono::prelude::*;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::io::{self, Write};

/// Observes placement outcomes and word completions; computes session
/// progress and accuracy and gates the session-complete signal so it fires
/// exactly once.
#[derive(Debug, Default)]
pub struct ScoreTracker {
    mode: ProgressMode,
    total_letters: usize,
    total_words: usize,
    correct_letters: usize,
    wrong_attempts: usize,
    completed_words: usize,
    session_complete_signaled: bool,
}

impl ScoreTracker {
    pub fn new(mode: ProgressMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Reset counters for a fresh session over `total_letters` letters across
    /// `total_words` words.
    pub fn start(&mut self, total_letters: usize, total_words: usize) {
        self.total_letters = total_letters;
        self.total_words = total_words;
        self.correct_letters = 0;
        self.wrong_attempts = 0;
        self.completed_words = 0;
        self.session_complete_signaled = false;
    }

    pub fn on_correct_placement(&mut self) {
        self.correct_letters += 1;
    }

    pub fn on_incorrect_placement(&mut self) {
        self.wrong_attempts += 1;
    }

    pub fn on_word_completed(&mut self) {
        self.completed_words += 1;
    }

    pub fn correct_letters(&self) -> usize {
        self.correct_letters
    }

    pub fn wrong_attempts(&self) -> usize {
        self.wrong_attempts
    }

    pub fn completed_words(&self) -> usize {
        self.completed_words
    }

    /// Fraction of the session completed, per the configured metric,
    /// clamped to [0, 1].
    pub fn progress_ratio(&self) -> f64 {
        let (done, total) = match self.mode {
            ProgressMode::Letters => (self.correct_letters, self.total_letters),
            ProgressMode::Words => (self.completed_words, self.total_words),
        };
        if total == 0 {
            return 0.0;
        }
        (done as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Fraction of placement attempts that were correct; 1.0 before any
    /// attempt has been made.
    pub fn accuracy_ratio(&self) -> f64 {
        let attempts = self.correct_letters + self.wrong_attempts;
        if attempts == 0 {
            return 1.0;
        }
        self.correct_letters as f64 / attempts as f64
    }

    /// Idempotent gate for the session-complete signal. Both completion
    /// paths (progress crossing 1.0, the last word leaving the session)
    /// funnel through here, so simultaneous completions cannot double-fire.
    pub fn try_signal_session_complete(&mut self) -> bool {
        if self.session_complete_signaled {
            return false;
        }
        self.session_complete_signaled = true;
        true
    }

    pub fn session_complete_signaled(&self) -> bool {
        self.session_complete_signaled
    }

    /// Append one line per finished session to the play log.
    pub fn save_session_log(&self, language: &str) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "spellfall") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(config_dir)?;

            // If the log doesn't exist yet, we need to emit a header
            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(
                    log_file,
                    "date,language,words_completed,letters_placed,wrong_attempts,accuracy"
                )?;
            }

            writeln!(
                log_file,
                "{},{},{},{},{},{:.3}",
                Local::now().format("%c"),
                language,
                self.completed_words,
                self.correct_letters,
                self.wrong_attempts,
                self.accuracy_ratio(),
            )?;
        }

        Ok(())
    }
}
