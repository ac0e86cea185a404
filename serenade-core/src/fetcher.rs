//! Lyrics fetcher that loads lyric sheets whenever the track changes.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::playback::TrackInfo;
use crate::source::{select_source, LyricsSource};
use crate::sync::{SyncEngine, SyncEvent};
use crate::track::LyricTrack;

const LOG_TARGET: &str = "serenade::fetcher";

/// Lyrics fetcher that listens for track changes and loads lyrics
pub struct LyricsFetcher {
    sync_engine: Arc<SyncEngine>,
    sources: Vec<Box<dyn LyricsSource>>,
    cancel_token: CancellationToken,
}

impl LyricsFetcher {
    /// Create a new lyrics fetcher
    ///
    /// # Arguments
    /// * `sync_engine` - Sync engine to listen for track changes
    /// * `sources` - Lyric sources, asked in order which one supports a location
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        sync_engine: Arc<SyncEngine>,
        sources: Vec<Box<dyn LyricsSource>>,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            sync_engine,
            sources,
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start the lyrics fetcher in a background task
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the lyrics fetching loop
    async fn run(&self) {
        info!(target: LOG_TARGET, "Initializing lyrics fetching handler");

        let mut rx = self.sync_engine.subscribe();

        // A track may already be on the turntable
        self.load_current_if_missing().await;

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Lyrics fetcher shutting down");
                    break;
                }
                event = rx.recv() => {
                    match event {
                        Ok(SyncEvent::TrackChanged { track, .. } |
                           SyncEvent::PlaybackStarted { track, .. }) => {
                            self.load_lyrics_for_track(&track).await;
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            break;
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!(target: LOG_TARGET, "Missed {} sync events", n);
                            // A track change may have been among them
                            self.load_current_if_missing().await;
                        }
                        Ok(_) => {}
                    }
                }
            }
        }
    }

    /// Load lyrics for the current track unless it already has them.
    ///
    /// Returns `true` if a load was attempted.
    pub async fn load_current_if_missing(&self) -> bool {
        let Some(track) = self.sync_engine.current_track().await else {
            return false;
        };
        if self.sync_engine.lyrics().await.is_some() {
            return false;
        }

        info!(
            target: LOG_TARGET,
            "Track {} has no lyrics loaded, loading them", track.title
        );
        self.load_lyrics_for_track(&track).await;
        true
    }

    /// Fetch and parse the lyric sheet for `track`
    ///
    /// # Errors
    ///
    /// Returns an error if no source supports the location or the fetch fails.
    pub async fn fetch_lyrics(&self, track: &TrackInfo) -> Result<LyricTrack> {
        let source = select_source(&self.sources, &track.lyrics)?;
        info!(
            target: LOG_TARGET,
            "Loading lyrics for {} from {} (source: {})",
            track.title,
            track.lyrics,
            source.name()
        );

        let raw = source.fetch(&track.lyrics).await?;
        let (lyrics, diagnostics) = LyricTrack::parse(&raw);
        debug!(target: LOG_TARGET, "Parsed lyrics for {}: {:?}", track.id, diagnostics);

        Ok(lyrics)
    }

    /// Load lyrics for a track and hand the result to the sync engine.
    ///
    /// Failures are logged and reported as "no lyrics"; there is no retry.
    pub async fn load_lyrics_for_track(&self, track: &TrackInfo) {
        match self.fetch_lyrics(track).await {
            Ok(lyrics) if !lyrics.is_empty() => {
                info!(
                    target: LOG_TARGET,
                    "Loaded {} lyric lines for {}",
                    lyrics.len(),
                    track.title
                );
                self.sync_engine.set_lyrics(&track.id, lyrics).await;
            }
            Ok(_) => {
                info!(target: LOG_TARGET, "No timed lyric lines for {}", track.title);
                self.sync_engine.set_no_lyrics(&track.id).await;
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Failed to load lyrics for {}: {}", track.title, e);
                self.sync_engine.set_no_lyrics(&track.id).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::playback::PlaybackState;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory source keyed by location
    struct MemorySource {
        sheets: HashMap<String, String>,
        calls: Arc<AtomicUsize>,
    }

    impl MemorySource {
        fn new(sheets: &[(&str, &str)]) -> Self {
            Self {
                sheets: sheets
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl LyricsSource for MemorySource {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn supports(&self, location: &str) -> bool {
            location.starts_with("mem:")
        }

        async fn fetch(&self, location: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sheets
                .get(location)
                .cloned()
                .ok_or_else(|| CoreError::LyricsNotFound {
                    location: location.to_string(),
                })
        }
    }

    fn track(id: &str, lyrics: &str) -> TrackInfo {
        TrackInfo::new(id, id, "Artist", Duration::from_secs(60)).with_lyrics(lyrics)
    }

    fn fetcher(engine: &Arc<SyncEngine>) -> LyricsFetcher {
        fetcher_with_calls(engine).0
    }

    /// Fetcher plus a count of the fetches its source has served
    fn fetcher_with_calls(engine: &Arc<SyncEngine>) -> (LyricsFetcher, Arc<AtomicUsize>) {
        let source = MemorySource::new(&[
            ("mem:good", "[ti:Good]\n[00:00.00]First\n[00:05.00]Second"),
            ("mem:tags", "[ti:Only tags]"),
        ]);
        let calls = Arc::clone(&source.calls);
        let fetcher = LyricsFetcher::new(Arc::clone(engine), vec![Box::new(source)], None);
        (fetcher, calls)
    }

    async fn play(engine: &SyncEngine, track: TrackInfo) {
        engine
            .update_state(PlaybackState::new(
                false,
                Some(track),
                Duration::ZERO,
                Duration::from_secs(60),
            ))
            .await;
    }

    #[tokio::test]
    async fn test_load_success() {
        let engine = SyncEngine::new("~");
        let fetcher = fetcher(&engine);
        let track = track("a", "mem:good");
        play(&engine, track.clone()).await;

        fetcher.load_lyrics_for_track(&track).await;

        let lyrics = engine.lyrics().await.unwrap();
        assert_eq!(lyrics.len(), 2);
        assert_eq!(engine.display_text().await, "First");
    }

    #[tokio::test]
    async fn test_load_failure_clears() {
        let engine = SyncEngine::new("~");
        let fetcher = fetcher(&engine);
        let mut rx = engine.subscribe();
        let track = track("a", "mem:missing");
        play(&engine, track.clone()).await;

        fetcher.load_lyrics_for_track(&track).await;

        assert!(engine.lyrics().await.is_none());
        assert_eq!(engine.display_text().await, "~");
        let mut saw_not_found = false;
        while let Ok(event) = rx.try_recv() {
            saw_not_found |= matches!(event, SyncEvent::LyricsNotFound { .. });
        }
        assert!(saw_not_found);
    }

    #[tokio::test]
    async fn test_zero_lines_counts_as_missing() {
        let engine = SyncEngine::new("~");
        let fetcher = fetcher(&engine);
        let track = track("a", "mem:tags");
        play(&engine, track.clone()).await;

        fetcher.load_lyrics_for_track(&track).await;
        assert!(engine.lyrics().await.is_none());
    }

    #[tokio::test]
    async fn test_load_current_if_missing() {
        let engine = SyncEngine::new("~");
        let (fetcher, calls) = fetcher_with_calls(&engine);

        // Nothing on the turntable yet
        assert!(!fetcher.load_current_if_missing().await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Track changed without the fetcher hearing about it
        play(&engine, track("a", "mem:good")).await;
        assert!(fetcher.load_current_if_missing().await);
        assert_eq!(engine.lyrics().await.unwrap().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Already loaded, so no second fetch
        assert!(!fetcher.load_current_if_missing().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsupported_location() {
        let engine = SyncEngine::new("~");
        let fetcher = fetcher(&engine);
        let result = fetcher.fetch_lyrics(&track("a", "ftp://example.com/a.lrc")).await;
        assert!(matches!(result, Err(CoreError::UnsupportedLocation { .. })));
    }

    #[tokio::test]
    async fn test_background_loop_loads_on_track_change() {
        let engine = SyncEngine::new("~");
        let fetcher = Arc::new(fetcher(&engine));
        let token = fetcher.cancel_token();
        let mut rx = engine.subscribe();
        let handle = Arc::clone(&fetcher).start();

        // Let the loop subscribe before the track changes
        tokio::task::yield_now().await;
        play(&engine, track("a", "mem:good")).await;

        let loaded = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(SyncEvent::LyricsLoaded { lines, .. }) = rx.recv().await {
                    return lines;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(loaded, 2);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_startup_loads_existing_track() {
        let engine = SyncEngine::new("~");
        play(&engine, track("a", "mem:good")).await;

        let fetcher = Arc::new(fetcher(&engine));
        let token = fetcher.cancel_token();
        let handle = Arc::clone(&fetcher).start();

        tokio::time::timeout(Duration::from_secs(5), async {
            while engine.lyrics().await.is_none() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        token.cancel();
        handle.await.unwrap();
    }
}
