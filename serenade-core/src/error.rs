use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit it to customize themes and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Theme errors
    #[error("Unknown theme: {id}")]
    UnknownTheme { id: String },

    // Lyrics errors
    #[error("Lyrics not found at {location}")]
    LyricsNotFound { location: String },

    #[error("Lyrics source {source_name} failed for {location}: {reason}")]
    LyricsFetchFailed {
        source_name: String,
        location: String,
        reason: String,
    },

    #[error("No lyrics source supports location: {location}")]
    UnsupportedLocation { location: String },

    // Network errors
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
