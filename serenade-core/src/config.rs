use crate::display::DEFAULT_FILLER_TEXT;
use crate::error::{CoreError, Result};
use crate::theme::{builtin_themes, Theme, ThemeCatalog};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerenadeConfig {
    /// Theme used when neither the command line nor the session picks one
    #[serde(default = "default_theme_id")]
    pub default_theme: String,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub lyrics: LyricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "builtin_themes")]
    pub themes: Vec<Theme>,
}

fn default_theme_id() -> String {
    "sunrise".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Shown while no lyric line is active
    #[serde(default = "default_filler_text")]
    pub filler_text: String,
    /// How often the lyric display is refreshed
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// How often the playback position is pushed to listeners
    #[serde(default = "default_state_sync_interval")]
    pub state_sync_interval_ms: u64,
    /// Start the song again when it ends
    #[serde(default)]
    pub repeat: bool,
    /// Start spinning as soon as a theme is selected
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

fn default_filler_text() -> String {
    DEFAULT_FILLER_TEXT.to_string()
}

const fn default_tick_interval() -> u64 {
    100
}

const fn default_state_sync_interval() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}

impl PlayerConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn state_sync_interval(&self) -> Duration {
        Duration::from_millis(self.state_sync_interval_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            filler_text: default_filler_text(),
            tick_interval_ms: default_tick_interval(),
            state_sync_interval_ms: default_state_sync_interval(),
            repeat: false,
            autoplay: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsConfig {
    /// Directory relative lyric paths resolve against (defaults to the config dir)
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_connect_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    concat!("Serenade/", env!("CARGO_PKG_VERSION")).to_string()
}

impl LyricsConfig {
    /// Base directory for relative lyric paths
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .unwrap_or_else(crate::paths::config_dir)
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/serenade/serenade.log
    #[serde(default)]
    pub enabled: bool,
}

impl Default for SerenadeConfig {
    fn default() -> Self {
        Self {
            default_theme: default_theme_id(),
            player: PlayerConfig::default(),
            lyrics: LyricsConfig::default(),
            logging: LoggingConfig::default(),
            themes: builtin_themes(),
        }
    }
}

impl SerenadeConfig {
    /// Get the config file path (~/.config/serenade/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location or create the template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing a fresh template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `path`, writing the template there if it is missing
    ///
    /// # Errors
    ///
    /// Same as [`load_or_create`](Self::load_or_create).
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParseError`] for TOML syntax or shape errors
    /// and [`CoreError::ConfigInvalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let catalog = self.catalog()?;

        if !catalog.contains(&self.default_theme) {
            return Err(CoreError::ConfigInvalid {
                message: format!("default_theme '{}' is not a known theme", self.default_theme),
            });
        }

        if self.player.tick_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.tick_interval_ms must be greater than zero".to_string(),
            });
        }

        if self.player.state_sync_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.state_sync_interval_ms must be greater than zero".to_string(),
            });
        }

        if let Some(theme) = self.themes.iter().find(|t| t.track.lyrics.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!("theme '{}' has no lyrics location", theme.id),
            });
        }

        Ok(())
    }

    /// Theme catalog built from `themes`
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] if the theme list is empty or has duplicates.
    pub fn catalog(&self) -> Result<ThemeCatalog> {
        ThemeCatalog::new(self.themes.clone())
    }
}

pub const CONFIG_TEMPLATE: &str = r##"# Serenade Configuration
# ~/.config/serenade/config.toml

# Theme used when none is given on the command line and no session is saved
default_theme = "sunrise"

[player]
# Shown while no lyric line is active
filler_text = "♪ now playing ♪"
tick_interval_ms = 100
state_sync_interval_ms = 1000
repeat = false
autoplay = true

[lyrics]
# Relative lyric paths resolve against this directory (default: this config dir)
# base_dir = "/home/me/serenade"
request_timeout_secs = 10
connect_timeout_secs = 5

[logging]
# Also write logs to ~/.config/serenade/serenade.log
enabled = false

# Lyrics may be a local path, a file:// URL or an http(s):// URL

[[themes]]
id = "sunrise"
name = "Warm Sunrise"
greeting = "Happy birthday! May your year glow like a sunrise."
accent = "#FFB347"

[themes.track]
title = "Happy Birthday (Acoustic)"
artist = "The Party Band"
audio = "audio/sunrise.mp3"
lyrics = "lyrics/sunrise.lrc"
duration_secs = 48

[[themes]]
id = "vinyl"
name = "Retro Vinyl"
greeting = "Another spin around the sun. Happy birthday!"
accent = "#C0392B"

[themes.track]
title = "Birthday Groove"
artist = "The Party Band"
audio = "audio/vinyl.mp3"
lyrics = "lyrics/vinyl.lrc"
duration_secs = 52

[[themes]]
id = "starlight"
name = "Starlight"
greeting = "Make a wish under the stars. Happy birthday!"
accent = "#6C5CE7"

[themes.track]
title = "Wish Upon a Candle"
artist = "The Party Band"
audio = "audio/starlight.mp3"
lyrics = "lyrics/starlight.lrc"
duration_secs = 45
"##;
