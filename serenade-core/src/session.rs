//! Session persistence: remembers the last selected theme between runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Persisted session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Id of the last selected theme
    pub theme: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn with_theme(theme: impl Into<String>) -> Self {
        Self {
            theme: Some(theme.into()),
        }
    }

    /// Load session state from the default session file.
    /// Returns `None` if the file doesn't exist or can't be parsed.
    #[must_use]
    pub fn load() -> Option<Self> {
        Self::load_from(&crate::paths::session_path())
    }

    /// Load session state from `path`.
    #[must_use]
    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => {
                    info!("Loaded session state from {:?}", path);
                    Some(state)
                }
                Err(e) => {
                    warn!("Failed to parse session state: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read session state file: {}", e);
                None
            }
        }
    }

    /// Save session state to the default session file.
    pub fn save(&self) {
        self.save_to(&crate::paths::session_path());
    }

    /// Save session state to `path`. Failures are logged, never returned.
    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create session state directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    warn!("Failed to write session state: {}", e);
                } else {
                    info!("Saved session state to {:?}", path);
                }
            }
            Err(e) => {
                warn!("Failed to serialize session state: {}", e);
            }
        }
    }
}
