use crate::display::{DisplayState, DisplayUpdate, LyricDisplay};
use crate::lrc::LrcMetadata;
use crate::playback::{PlaybackState, TrackInfo};
use crate::track::LyricTrack;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const LOG_TARGET: &str = "serenade::sync";

/// Position jumps larger than this are reported as seeks
const SEEK_THRESHOLD: Duration = Duration::from_secs(2);

/// Events emitted by the sync engine
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Playback started for a track
    PlaybackStarted {
        track: TrackInfo,
        position: Duration,
    },
    /// Playback was paused
    PlaybackPaused {
        position: Duration,
    },
    /// Playback was resumed
    PlaybackResumed {
        position: Duration,
    },
    /// Playback stopped (no track loaded)
    PlaybackStopped,
    /// Track changed to a new track
    TrackChanged {
        track: TrackInfo,
        position: Duration,
    },
    /// Regular position sync update
    PositionSync {
        position: Duration,
    },
    /// A seek occurred within the current track
    SeekOccurred {
        position: Duration,
    },
    /// Lyrics were loaded for the current track
    LyricsLoaded {
        track_id: String,
        metadata: LrcMetadata,
        lines: usize,
    },
    /// No usable lyrics for the current track
    LyricsNotFound {
        track_id: String,
    },
    /// The displayed lyric changed
    LineChanged {
        text: String,
        /// Active line, `None` while the filler is shown
        index: Option<usize>,
        position: Duration,
    },
}

/// Sync engine state
struct SyncEngineInner {
    state: PlaybackState,
    display: LyricDisplay,
}

/// Engine that synchronizes playback state and lyrics
pub struct SyncEngine {
    inner: RwLock<SyncEngineInner>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl SyncEngine {
    /// Create a new sync engine showing `filler` while no line is active
    #[must_use]
    pub fn new(filler: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::with_display(LyricDisplay::new(filler)))
    }

    fn with_display(display: LyricDisplay) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            inner: RwLock::new(SyncEngineInner {
                state: PlaybackState::default(),
                display,
            }),
            event_tx,
        }
    }

    /// Subscribe to sync events
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: SyncEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    fn emit_line(&self, update: &DisplayUpdate, position: Duration) {
        let index = match update.state {
            DisplayState::Line(i) => Some(i),
            DisplayState::Filler => None,
        };
        self.emit(SyncEvent::LineChanged {
            text: update.text.clone(),
            index,
            position,
        });
    }

    /// Clear lyrics, emitting a line change if a line was showing
    fn clear_display(&self, inner: &mut SyncEngineInner, position: Duration) {
        let was_showing_line = inner.display.state() != DisplayState::Filler;
        inner.display.clear();
        if was_showing_line {
            self.emit(SyncEvent::LineChanged {
                text: inner.display.text().to_string(),
                index: None,
                position,
            });
        }
    }

    /// Update playback state and emit appropriate events
    pub async fn update_state(&self, new_state: PlaybackState) {
        let mut inner = self.inner.write().await;
        let old_state = &inner.state;

        // Detect what changed
        let track_changed = old_state.track_changed(&new_state);
        let playback_changed = old_state.playback_state_changed(&new_state);
        let seek_occurred = old_state.seek_occurred(&new_state, SEEK_THRESHOLD);
        let had_track = old_state.track.is_some();

        if track_changed {
            // Lyrics belong to the old track until the fetcher reports back
            self.clear_display(&mut inner, new_state.position);

            if let Some(ref track) = new_state.track {
                self.emit(SyncEvent::TrackChanged {
                    track: track.clone(),
                    position: new_state.position,
                });
                // Also emit play state so listeners know if track is playing or paused
                if new_state.is_playing {
                    self.emit(SyncEvent::PlaybackResumed {
                        position: new_state.position,
                    });
                } else {
                    self.emit(SyncEvent::PlaybackPaused {
                        position: new_state.position,
                    });
                }
            } else {
                self.emit(SyncEvent::PlaybackStopped);
            }
        } else if playback_changed {
            if new_state.is_playing {
                if had_track {
                    self.emit(SyncEvent::PlaybackResumed {
                        position: new_state.position,
                    });
                } else if let Some(ref track) = new_state.track {
                    self.emit(SyncEvent::PlaybackStarted {
                        track: track.clone(),
                        position: new_state.position,
                    });
                }
            } else {
                self.emit(SyncEvent::PlaybackPaused {
                    position: new_state.position,
                });
            }
        } else if seek_occurred {
            self.emit(SyncEvent::SeekOccurred {
                position: new_state.position,
            });
        } else {
            self.emit(SyncEvent::PositionSync {
                position: new_state.position,
            });
        }

        inner.state = new_state;
    }

    /// Install lyrics for `track_id`.
    ///
    /// Ignored (returns `false`) when `track_id` is no longer the current
    /// track, so a slow load cannot overwrite a newer one. An empty track is
    /// treated as no lyrics.
    pub async fn set_lyrics(&self, track_id: &str, lyrics: LyricTrack) -> bool {
        if lyrics.is_empty() {
            return self.set_no_lyrics(track_id).await;
        }

        let mut inner = self.inner.write().await;
        if !is_current(&inner.state, track_id) {
            debug!(target: LOG_TARGET, "Discarding stale lyrics for {}", track_id);
            return false;
        }

        let metadata = lyrics.metadata().clone();
        let lines = lyrics.len();
        inner.display.load(lyrics);

        self.emit(SyncEvent::LyricsLoaded {
            track_id: track_id.to_string(),
            metadata,
            lines,
        });

        // Show the right line immediately instead of waiting for the next tick
        let position = inner.state.interpolated_position();
        let update = inner.display.tick(position.as_secs_f64());
        if update.changed {
            self.emit_line(&update, position);
        }
        true
    }

    /// Mark that no lyrics are available for `track_id`.
    ///
    /// Returns `false` if `track_id` is no longer the current track.
    pub async fn set_no_lyrics(&self, track_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        if !is_current(&inner.state, track_id) {
            debug!(target: LOG_TARGET, "Ignoring stale no-lyrics result for {}", track_id);
            return false;
        }

        let position = inner.state.interpolated_position();
        self.clear_display(&mut inner, position);
        self.emit(SyncEvent::LyricsNotFound {
            track_id: track_id.to_string(),
        });
        true
    }

    /// Run the render step at an explicit playback position
    pub async fn tick(&self, position: Duration) -> DisplayUpdate {
        let mut inner = self.inner.write().await;
        let update = inner.display.tick(position.as_secs_f64());
        if update.changed {
            self.emit_line(&update, position);
        }
        update
    }

    /// Run the render step at the interpolated playback position
    pub async fn tick_now(&self) -> DisplayUpdate {
        let mut inner = self.inner.write().await;
        let position = inner.state.interpolated_position();
        let update = inner.display.tick(position.as_secs_f64());
        if update.changed {
            self.emit_line(&update, position);
        }
        update
    }

    /// Get current playback state
    pub async fn state(&self) -> PlaybackState {
        self.inner.read().await.state.clone()
    }

    /// Get current lyrics
    pub async fn lyrics(&self) -> Option<LyricTrack> {
        self.inner.read().await.display.track().cloned()
    }

    /// Metadata tags of the loaded lyrics
    pub async fn lyrics_metadata(&self) -> Option<LrcMetadata> {
        self.inner
            .read()
            .await
            .display
            .track()
            .map(|t| t.metadata().clone())
    }

    /// Text currently on display
    pub async fn display_text(&self) -> String {
        self.inner.read().await.display.text().to_string()
    }

    /// Get interpolated current position
    pub async fn current_position(&self) -> Duration {
        self.inner.read().await.state.interpolated_position()
    }

    /// Check if currently playing
    pub async fn is_playing(&self) -> bool {
        self.inner.read().await.state.is_playing
    }

    /// Get current track info
    pub async fn current_track(&self) -> Option<TrackInfo> {
        self.inner.read().await.state.track.clone()
    }
}

fn is_current(state: &PlaybackState, track_id: &str) -> bool {
    state.track.as_ref().is_some_and(|t| t.id == track_id)
}
