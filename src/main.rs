mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use spellfall::{
    catalog::{LengthSampler, RandomSampler, WordCatalog, WordSampler},
    celebration::CelebrationAnimation,
    config::{ConfigStore, FileConfigStore, GameConfig, ProgressMode, UserConfig},
    engine::Engine,
    events::GameEvent,
    runtime::{CrosstermEventSource, FixedTicker, Runner, UiEvent},
    stats::LetterSummary,
    token::TokenId,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 50;

/// terminal spelling puzzle with drifting letter tokens
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal spelling puzzle: the letters of a word drift around the board as draggable tokens, and you drop each one into its goal slot. Tracks progress, accuracy, and which letters give you trouble."
)]
pub struct Cli {
    /// language to pull words from
    #[clap(short = 'l', long, value_enum)]
    language: Option<SupportedLanguage>,

    /// number of words in the session
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// restrict the session to words of this exact length
    #[clap(long)]
    word_length: Option<usize>,

    /// cap on concurrently drifting tokens (default: one per letter)
    #[clap(long)]
    max_tokens: Option<usize>,

    /// progress metric for the session bar
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ProgressArg>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum SupportedLanguage {
    English,
    Spanish,
}

impl SupportedLanguage {
    fn code(&self) -> String {
        self.to_string().to_lowercase()
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum ProgressArg {
    Letters,
    Words,
}

impl From<ProgressArg> for ProgressMode {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::Letters => ProgressMode::Letters,
            ProgressArg::Words => ProgressMode::Words,
        }
    }
}

/// CLI flags merged over the stored defaults; what actually drives a session.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub language: String,
    pub number_of_words: usize,
    pub word_length: Option<usize>,
    pub max_tokens: Option<usize>,
    pub progress_mode: ProgressMode,
}

impl RuntimeSettings {
    fn resolve(cli: &Cli, stored: &UserConfig) -> Self {
        Self {
            language: cli
                .language
                .map(|l| l.code())
                .unwrap_or_else(|| stored.language.clone()),
            number_of_words: cli.number_of_words.unwrap_or(stored.number_of_words),
            word_length: cli.word_length.or(stored.word_length),
            max_tokens: cli.max_tokens.or(stored.max_tokens),
            progress_mode: cli
                .mode
                .map(ProgressMode::from)
                .unwrap_or(stored.progress_mode),
        }
    }

    fn to_user_config(&self) -> UserConfig {
        UserConfig {
            language: self.language.clone(),
            number_of_words: self.number_of_words,
            word_length: self.word_length,
            max_tokens: self.max_tokens,
            progress_mode: self.progress_mode,
        }
    }

    fn sampler(&self) -> Box<dyn WordSampler> {
        match self.word_length {
            Some(length) => Box::new(LengthSampler { length }),
            None => Box::new(RandomSampler),
        }
    }

    fn game_config(&self) -> GameConfig {
        GameConfig {
            max_live_tokens: self.max_tokens,
            progress_mode: self.progress_mode,
            ..GameConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Playing,
    Results,
}

pub struct App {
    pub engine: Engine,
    pub state: AppState,
    pub celebration: CelebrationAnimation,
    pub summary: Option<Vec<LetterSummary>>,
    pub settings: RuntimeSettings,
}

impl App {
    pub fn new(settings: RuntimeSettings) -> Result<Self, Box<dyn Error>> {
        let mut engine = Engine::new(WordCatalog::embedded(), settings.game_config());
        engine.start_session(
            settings.sampler().as_ref(),
            Some(&settings.language),
            settings.number_of_words,
        )?;
        Ok(Self {
            engine,
            state: AppState::Playing,
            celebration: CelebrationAnimation::new(),
            summary: None,
            settings,
        })
    }

    pub fn new_session(&mut self) -> Result<(), Box<dyn Error>> {
        self.engine.start_session(
            self.settings.sampler().as_ref(),
            Some(&self.settings.language),
            self.settings.number_of_words,
        )?;
        self.state = AppState::Playing;
        self.summary = None;
        self.celebration = CelebrationAnimation::new();
        Ok(())
    }

    pub fn on_tick(&mut self, width: u16, height: u16) {
        let dt = TICK_RATE_MS as f64 / 1000.0;
        self.engine.tick(dt);

        for event in self.engine.drain_events() {
            match event {
                GameEvent::WordCompleted(word) => {
                    self.celebration.start_word_burst(&word.text, width, height);
                }
                GameEvent::SessionComplete => {
                    self.summary = self.engine.letter_summary();
                    self.state = AppState::Results;
                }
                _ => {}
            }
        }

        self.celebration.update(dt);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = RuntimeSettings::resolve(&cli, &store.load());
    let _ = store.save(&settings.to_user_config());

    // Surface EmptyCatalog before touching the terminal.
    let mut app = App::new(settings)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut dragged: Option<TokenId> = None;

    loop {
        terminal.draw(|f| draw(app, f))?;

        match runner.step() {
            UiEvent::Tick => {
                let size = terminal.size().unwrap_or_default();
                app.on_tick(size.width, size.height);
            }
            UiEvent::Resize => {}
            UiEvent::Mouse(mouse) => {
                let size = terminal.size().unwrap_or_default();
                handle_mouse(app, &mut dragged, mouse, size.width, size.height);
            }
            UiEvent::Key(key) => {
                if handle_key(app, key)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool, Box<dyn Error>> {
    match key.code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Ok(true);
        }
        KeyCode::Char('n') => {
            app.new_session()?;
        }
        _ => {}
    }
    Ok(false)
}

fn handle_mouse(
    app: &mut App,
    dragged: &mut Option<TokenId>,
    mouse: MouseEvent,
    width: u16,
    height: u16,
) {
    if app.state != AppState::Playing {
        return;
    }

    let vp = ui::board_viewport(Rect::new(0, 0, width, height));
    let size = app.engine.geometry().size();
    let (bx, by) = ui::cell_to_board(vp, size, mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(id) = app.engine.pick_token(bx, by) {
                if app.engine.begin_drag(id) {
                    app.engine.drag_to(id, bx, by);
                    *dragged = Some(id);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(id) = *dragged {
                app.engine.drag_to(id, bx, by);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if let Some(id) = dragged.take() {
                app.engine.end_drag(id, bx, by);
            }
        }
        _ => {}
    }
}

fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
