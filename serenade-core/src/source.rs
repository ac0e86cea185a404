//! Lyric sheet sources.
//!
//! A source turns a lyrics location from the theme catalog (a path, a
//! `file://` URL or an `http(s)://` URL) into raw LRC text. The fetcher asks
//! each configured source in order whether it [`supports`](LyricsSource::supports)
//! a location and uses the first that does.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

const LOG_TARGET: &str = "serenade::source::file";

/// Trait for lyric sheet sources
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Whether this source can load `location`
    fn supports(&self, location: &str) -> bool;

    /// Fetch the raw LRC text at `location`
    async fn fetch(&self, location: &str) -> Result<String>;
}

/// Reads lyric sheets from the local filesystem
#[derive(Debug, Clone)]
pub struct FileLyricsSource {
    base_dir: PathBuf,
}

impl FileLyricsSource {
    /// Relative paths are resolved against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Turn a location into a filesystem path
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedLocation`] for non-file URLs or file URLs
    /// that do not map to a local path.
    pub fn resolve(&self, location: &str) -> Result<PathBuf> {
        let unsupported = || CoreError::UnsupportedLocation {
            location: location.to_string(),
        };

        let path = match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|()| unsupported())?,
            // Windows drive letters parse as one-letter schemes
            Ok(url) if url.scheme().len() == 1 => PathBuf::from(location),
            Ok(_) => return Err(unsupported()),
            Err(_) => PathBuf::from(location),
        };

        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(self.base_dir.join(path))
        }
    }
}

#[async_trait]
impl LyricsSource for FileLyricsSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn supports(&self, location: &str) -> bool {
        !location.trim().is_empty() && self.resolve(location).is_ok()
    }

    async fn fetch(&self, location: &str) -> Result<String> {
        let path = self.resolve(location)?;
        debug!(target: LOG_TARGET, "Reading lyrics from {}", path.display());

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CoreError::LyricsNotFound {
                location: location.to_string(),
            }),
            Err(e) => Err(CoreError::Io(e)),
        }
    }
}

/// Pick the first source that supports `location`
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedLocation`] if no source accepts it.
pub fn select_source<'a>(
    sources: &'a [Box<dyn LyricsSource>],
    location: &str,
) -> Result<&'a dyn LyricsSource> {
    for source in sources {
        if source.supports(location) {
            return Ok(&**source);
        }
    }
    Err(CoreError::UnsupportedLocation {
        location: location.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "[ti:Test]\n[00:01.00]Hello";

    #[tokio::test]
    async fn test_fetch_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lyrics")).unwrap();
        std::fs::write(dir.path().join("lyrics").join("song.lrc"), SHEET).unwrap();

        let source = FileLyricsSource::new(dir.path());
        assert!(source.supports("lyrics/song.lrc"));
        assert_eq!(source.fetch("lyrics/song.lrc").await.unwrap(), SHEET);
    }

    #[tokio::test]
    async fn test_fetch_absolute_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.lrc");
        std::fs::write(&path, SHEET).unwrap();

        let source = FileLyricsSource::new("/does/not/matter");
        let absolute = path.to_string_lossy().to_string();
        assert_eq!(source.fetch(&absolute).await.unwrap(), SHEET);

        let url = Url::from_file_path(&path).unwrap().to_string();
        assert!(source.supports(&url));
        assert_eq!(source.fetch(&url).await.unwrap(), SHEET);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileLyricsSource::new(dir.path());
        let result = source.fetch("missing.lrc").await;
        assert!(matches!(result, Err(CoreError::LyricsNotFound { .. })));
    }

    #[test]
    fn test_remote_urls_not_supported() {
        let source = FileLyricsSource::new(".");
        assert!(!source.supports("https://example.com/song.lrc"));
        assert!(!source.supports("http://example.com/song.lrc"));
        assert!(!source.supports(""));
        assert!(matches!(
            source.resolve("https://example.com/song.lrc"),
            Err(CoreError::UnsupportedLocation { .. })
        ));
    }

    #[test]
    fn test_select_source() {
        let sources: Vec<Box<dyn LyricsSource>> = vec![Box::new(FileLyricsSource::new("."))];
        assert_eq!(select_source(&sources, "song.lrc").unwrap().name(), "file");
        assert!(matches!(
            select_source(&sources, "https://example.com/song.lrc"),
            Err(CoreError::UnsupportedLocation { .. })
        ));
    }
}
