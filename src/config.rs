use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How session progress is measured: correctly placed letters, or completed
/// words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProgressMode {
    #[default]
    Letters,
    Words,
}

/// Immutable tuning for the engine. Built once at startup and handed to each
/// component at construction; nothing mutates it afterwards.
///
/// Geometry is in abstract board units; presentation scales them to whatever
/// surface it renders on.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    // session
    pub active_set_limit: usize,

    // board geometry
    pub play_width: f64,
    pub play_height: f64,
    pub goal_row_y: f64,
    pub goal_hit_radius: f64,

    // token lifecycle, delays in seconds
    pub max_live_tokens: Option<usize>, // None: one per letter of the current word
    pub spawn_stagger_min: f64,
    pub spawn_stagger_max: f64,
    pub respawn_delay: f64,
    pub placement_spawn_delay: f64,
    pub word_clear_delay: f64,
    pub token_lifespan: f64,

    // physics, per-second units
    pub drag_pull: f64,
    pub drag_damping: f64,
    pub max_drag_speed: f64,
    pub drift_threshold: f64,
    pub drift_impulse: f64,
    pub goal_repel: f64,
    pub restitution: f64,
    pub air_friction: f64,

    // scoring
    pub progress_mode: ProgressMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            active_set_limit: 15,
            play_width: 800.0,
            play_height: 600.0,
            goal_row_y: 80.0,
            goal_hit_radius: 60.0,
            max_live_tokens: None,
            spawn_stagger_min: 0.5,
            spawn_stagger_max: 1.5,
            respawn_delay: 1.0,
            placement_spawn_delay: 0.5,
            word_clear_delay: 2.0,
            token_lifespan: 120.0,
            drag_pull: 10.0,
            drag_damping: 0.9,
            max_drag_speed: 1000.0,
            drift_threshold: 0.6,
            drift_impulse: 30.0,
            goal_repel: 200.0,
            restitution: 0.8,
            air_friction: 0.05,
            progress_mode: ProgressMode::Letters,
        }
    }
}

impl GameConfig {
    /// Effective concurrent-token cap for a word of `word_len` letters.
    pub fn token_cap(&self, word_len: usize) -> usize {
        self.max_live_tokens.unwrap_or(word_len).min(word_len)
    }
}

/// Persisted CLI defaults, so flags only need passing when they change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserConfig {
    pub language: String,
    pub number_of_words: usize,
    pub word_length: Option<usize>,
    pub max_tokens: Option<usize>,
    pub progress_mode: ProgressMode,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            number_of_words: 10,
            word_length: None,
            max_tokens: None,
            progress_mode: ProgressMode::Letters,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> UserConfig;
    fn save(&self, cfg: &UserConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "spellfall") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("spellfall_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> UserConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<UserConfig>(&bytes) {
                return cfg;
            }
        }
        UserConfig::default()
    }

    fn save(&self, cfg: &UserConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
