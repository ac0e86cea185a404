pub mod config;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod lrc;
pub mod paths;
pub mod playback;
pub mod player;
pub mod session;
pub mod source;
pub mod sync;
pub mod theme;
pub mod time;
pub mod track;

pub use config::{
    LoggingConfig, LyricsConfig, PlayerConfig, SerenadeConfig, CONFIG_TEMPLATE,
};

pub use display::{DisplayState, DisplayUpdate, LyricDisplay, DEFAULT_FILLER_TEXT};
pub use error::{CoreError, Result};
pub use fetcher::LyricsFetcher;
pub use lrc::{LrcMetadata, LyricLine, ParseDiagnostics};
pub use paths::{
    config_dir, log_file_path, session_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME,
    SESSION_FILE_NAME,
};
pub use playback::{PlaybackState, TrackInfo};
pub use player::{Turntable, TurntableCommand};
pub use session::SessionState;
pub use source::{select_source, FileLyricsSource, LyricsSource};
pub use sync::{SyncEngine, SyncEvent};
pub use theme::{builtin_themes, Theme, ThemeCatalog, ThemeTrack};
pub use time::{secs_to_duration, DurationExt};
pub use track::{LyricMatch, LyricTrack};
