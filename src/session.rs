use crate::catalog::{Word, WordCatalog, WordSampler};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;

/// Session-level errors surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// No words exist for the request; the session cannot start. Not
    /// retryable without changing parameters.
    EmptyCatalog,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyCatalog => write!(f, "no words available for the request"),
        }
    }
}

impl Error for SessionError {}

/// What `complete_word` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The word moved to the completed set; more words remain.
    Advanced,
    /// The word moved to the completed set and nothing remains.
    SessionComplete,
    /// The word was already completed; nothing changed.
    AlreadyCompleted,
}

/// The player's run across a bounded set of words: a visible active set, a
/// FIFO overflow pool, and the completed set. A word lives in exactly one of
/// the three at any time.
#[derive(Debug, Clone)]
pub struct Session {
    pub language: Option<String>,
    pub target_count: usize,
    active: Vec<Word>,
    pool: VecDeque<Word>,
    completed: Vec<Word>,
}

impl Session {
    pub fn active(&self) -> &[Word] {
        &self.active
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn completed(&self) -> &[Word] {
        &self.completed
    }

    pub fn total_words(&self) -> usize {
        self.active.len() + self.pool.len() + self.completed.len()
    }

    pub fn total_letters(&self) -> usize {
        self.active
            .iter()
            .chain(self.pool.iter())
            .chain(self.completed.iter())
            .map(Word::letter_count)
            .sum()
    }
}

/// Owns the session: which words are in play, waiting, and done, and which
/// word is current (the front of the active set).
#[derive(Debug, Default)]
pub struct SessionManager {
    active_set_limit: usize,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(active_set_limit: usize) -> Self {
        Self {
            active_set_limit,
            session: None,
        }
    }

    /// Sample `count` distinct words for `language` (the sampler falls back
    /// to any language when none match) and partition them into the bounded
    /// active set plus the overflow pool.
    pub fn start_session(
        &mut self,
        catalog: &WordCatalog,
        sampler: &dyn WordSampler,
        language: Option<&str>,
        count: usize,
    ) -> Result<(), SessionError> {
        let mut words = sampler.sample(catalog, language, count);
        if words.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }

        let pool = words.split_off(words.len().min(self.active_set_limit));
        self.session = Some(Session {
            language: language.map(str::to_string),
            target_count: count,
            active: words,
            pool: pool.into(),
            completed: Vec::new(),
        });
        Ok(())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The word the board is currently built for.
    pub fn current_word(&self) -> Option<&Word> {
        self.session.as_ref().and_then(|s| s.active.first())
    }

    /// Read-only view of the active working set, for presentation.
    pub fn current_active_words(&self) -> &[Word] {
        self.session.as_ref().map(|s| s.active()).unwrap_or(&[])
    }

    pub fn is_complete(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.active.is_empty() && s.pool.is_empty())
    }

    /// Move `text` from the active set to the completed set, refilling the
    /// active set from the pool front while below the bound. Completing a
    /// word twice is a no-op; the UI should prevent re-triggering, this is
    /// defensive.
    pub fn complete_word(&mut self, text: &str) -> CompletionOutcome {
        let Some(session) = self.session.as_mut() else {
            return CompletionOutcome::AlreadyCompleted;
        };

        let Some(pos) = session.active.iter().position(|w| w.text == text) else {
            debug_assert!(
                session.completed.iter().any(|w| w.text == text),
                "completed word {text:?} was never active"
            );
            return CompletionOutcome::AlreadyCompleted;
        };

        let word = session.active.remove(pos);
        session.completed.push(word);

        while session.active.len() < self.active_set_limit {
            match session.pool.pop_front() {
                Some(next) => session.active.push(next),
                None => break,
            }
        }

        if session.active.is_empty() && session.pool.is_empty() {
            CompletionOutcome::SessionComplete
        } else {
            CompletionOutcome::Advanced
        }
    }

    /// Drop the session entirely (player exit).
    pub fn end_session(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RandomSampler, WordEntry, WordList};
    use assert_matches::assert_matches;

    fn catalog_of(words: &[&str]) -> WordCatalog {
        WordCatalog::from_lists(vec![WordList {
            language: "english".into(),
            name: "english".into(),
            words: words
                .iter()
                .map(|w| WordEntry {
                    text: w.to_string(),
                    category: None,
                    image: None,
                    audio: None,
                })
                .collect(),
        }])
    }

    fn started(words: &[&str], limit: usize) -> SessionManager {
        let mut mgr = SessionManager::new(limit);
        mgr.start_session(&catalog_of(words), &RandomSampler, Some("english"), words.len())
            .unwrap();
        mgr
    }

    #[test]
    fn test_empty_catalog_fails_to_start() {
        let mut mgr = SessionManager::new(15);
        let result = mgr.start_session(
            &WordCatalog::from_lists(vec![]),
            &RandomSampler,
            Some("english"),
            5,
        );
        assert_matches!(result, Err(SessionError::EmptyCatalog));
        assert!(mgr.session().is_none());
    }

    #[test]
    fn test_partition_into_active_and_pool() {
        let words: Vec<String> = (0..20).map(|i| format!("word{i:02}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let mgr = started(&refs, 15);

        let session = mgr.session().unwrap();
        assert_eq!(session.active().len(), 15);
        assert_eq!(session.pool_len(), 5);
        assert_eq!(session.total_words(), 20);
        assert_eq!(session.language.as_deref(), Some("english"));
        assert_eq!(session.target_count, 20);
    }

    #[test]
    fn test_complete_word_refills_from_pool() {
        let words: Vec<String> = (0..17).map(|i| format!("word{i:02}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let mut mgr = started(&refs, 15);

        let first = mgr.current_word().unwrap().text.clone();
        assert_matches!(mgr.complete_word(&first), CompletionOutcome::Advanced);

        let session = mgr.session().unwrap();
        assert_eq!(session.active().len(), 15, "pool refills the active set");
        assert_eq!(session.pool_len(), 1);
        assert_eq!(session.completed().len(), 1);
        assert!(session.active().iter().all(|w| w.text != first));
    }

    #[test]
    fn test_word_is_in_exactly_one_partition() {
        let mut mgr = started(&["cat", "dog", "sun", "map"], 2);

        for _ in 0..4 {
            let current = mgr.current_word().unwrap().text.clone();
            mgr.complete_word(&current);

            let session = mgr.session().unwrap();
            let mut seen = std::collections::HashSet::new();
            for w in session
                .active()
                .iter()
                .chain(session.completed().iter())
            {
                assert!(seen.insert(w.text.clone()), "{} appears twice", w.text);
            }
            assert_eq!(session.total_words(), 4);
        }
    }

    #[test]
    fn test_two_word_session_completes_once() {
        let mut mgr = started(&["cat", "dog"], 15);

        let first = mgr.current_word().unwrap().text.clone();
        assert_matches!(mgr.complete_word(&first), CompletionOutcome::Advanced);

        let second = mgr.current_word().unwrap().text.clone();
        assert_matches!(mgr.complete_word(&second), CompletionOutcome::SessionComplete);
        assert!(mgr.is_complete());

        // Defensive re-completion stays a no-op.
        assert_matches!(mgr.complete_word(&second), CompletionOutcome::AlreadyCompleted);
    }

    #[test]
    fn test_double_completion_is_noop() {
        let mut mgr = started(&["cat", "dog"], 15);

        let first = mgr.current_word().unwrap().text.clone();
        mgr.complete_word(&first);
        let completed_before = mgr.session().unwrap().completed().len();

        assert_matches!(mgr.complete_word(&first), CompletionOutcome::AlreadyCompleted);
        assert_eq!(mgr.session().unwrap().completed().len(), completed_before);
    }

    #[test]
    fn test_current_word_advances_after_completion() {
        let mut mgr = started(&["cat", "dog"], 15);

        let first = mgr.current_word().unwrap().text.clone();
        mgr.complete_word(&first);
        let second = mgr.current_word().unwrap().text.clone();
        assert_ne!(first, second);
    }

    #[test]
    fn test_current_active_words_view() {
        let mut mgr = started(&["cat", "dog", "sun"], 2);
        assert_eq!(mgr.current_active_words().len(), 2);

        let first = mgr.current_word().unwrap().text.clone();
        mgr.complete_word(&first);
        assert_eq!(mgr.current_active_words().len(), 2, "refilled from pool");
        assert!(mgr.current_active_words().iter().all(|w| w.text != first));

        mgr.end_session();
        assert!(mgr.current_active_words().is_empty());
    }

    #[test]
    fn test_total_letters_spans_all_partitions() {
        let mut mgr = started(&["cat", "apple"], 1);
        assert_eq!(mgr.session().unwrap().total_letters(), 8);

        let first = mgr.current_word().unwrap().text.clone();
        mgr.complete_word(&first);
        assert_eq!(mgr.session().unwrap().total_letters(), 8);
    }

    #[test]
    fn test_end_session_destroys_state() {
        let mut mgr = started(&["cat"], 15);
        mgr.end_session();
        assert!(mgr.session().is_none());
        assert!(mgr.current_word().is_none());
    }
}
