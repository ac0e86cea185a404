//! Path constants for configuration, session and log files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "serenade";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the persisted session file (prefixed with . for hidden)
pub const SESSION_FILE_NAME: &str = ".session.json";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "serenade.log";

/// Get the configuration directory path (~/.config/serenade/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/serenade/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the session file path (`~/.config/serenade/.session.json`)
#[must_use]
pub fn session_path() -> PathBuf {
    config_dir().join(SESSION_FILE_NAME)
}

/// Get the log file path (`~/.config/serenade/serenade.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}
