//! The turntable: a media clock for the selected theme's song.
//!
//! Nothing is decoded or played here. The turntable keeps the playback
//! position for the loaded [`TrackInfo`], pushes [`PlaybackState`] to the
//! [`SyncEngine`] whenever it changes (and every state sync interval while
//! spinning), and ticks the lyric display on every tick interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::playback::{PlaybackState, TrackInfo};
use crate::sync::SyncEngine;
use crate::time::DurationExt;

const LOG_TARGET: &str = "serenade::turntable";

/// Commands accepted by a running turntable
#[derive(Debug, Clone)]
pub enum TurntableCommand {
    /// Put a new record on, starting at zero
    Load(TrackInfo),
    Play,
    Pause,
    /// Play if paused, pause if playing
    Toggle,
    /// Jump to a position; clamped to the track duration
    Seek(Duration),
    /// Take the record off
    Stop,
}

/// Position bookkeeping for the loaded record
#[derive(Debug, Default)]
struct Deck {
    track: Option<TrackInfo>,
    /// Position when `started_at` was taken (or the frozen position while paused)
    offset: Duration,
    /// Set while spinning
    started_at: Option<Instant>,
}

impl Deck {
    const fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    fn duration(&self) -> Duration {
        self.track.as_ref().map_or(Duration::ZERO, |t| t.duration)
    }

    fn position(&self, now: Instant) -> Duration {
        let position = match self.started_at {
            Some(started) => self.offset + now.saturating_duration_since(started),
            None => self.offset,
        };
        // A zero duration means the length is unknown
        let duration = self.duration();
        if duration.is_zero() {
            position
        } else {
            position.min(duration)
        }
    }

    fn at_end(&self, now: Instant) -> bool {
        let duration = self.duration();
        !duration.is_zero() && self.position(now) >= duration
    }

    fn load(&mut self, track: TrackInfo, play: bool, now: Instant) {
        self.track = Some(track);
        self.offset = Duration::ZERO;
        self.started_at = play.then_some(now);
    }

    fn play(&mut self, now: Instant) -> bool {
        if self.track.is_none() || self.is_playing() {
            return false;
        }
        if self.at_end(now) {
            self.offset = Duration::ZERO;
        }
        self.started_at = Some(now);
        true
    }

    fn pause(&mut self, now: Instant) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.offset = self.position(now);
        self.started_at = None;
        true
    }

    fn seek(&mut self, position: Duration, now: Instant) -> bool {
        if self.track.is_none() {
            return false;
        }
        let duration = self.duration();
        self.offset = if duration.is_zero() {
            position
        } else {
            position.min(duration)
        };
        if self.is_playing() {
            self.started_at = Some(now);
        }
        true
    }

    fn stop(&mut self) -> bool {
        let had_track = self.track.is_some();
        *self = Self::default();
        had_track
    }
}

/// Media clock driving the sync engine
pub struct Turntable {
    sync_engine: Arc<SyncEngine>,
    tick_interval: Duration,
    state_sync_interval: Duration,
    repeat: bool,
    autoplay: bool,
    cancel_token: CancellationToken,
}

impl Turntable {
    /// Create a turntable from player settings
    ///
    /// # Arguments
    /// * `sync_engine` - Engine receiving playback state and display ticks
    /// * `config` - Tick and sync intervals, repeat and autoplay
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        sync_engine: Arc<SyncEngine>,
        config: &PlayerConfig,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            sync_engine,
            tick_interval: config.tick_interval(),
            state_sync_interval: config.state_sync_interval(),
            repeat: config.repeat,
            autoplay: config.autoplay,
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start the turntable in a background task
    ///
    /// Returns the command sender and the task handle. The task ends when the
    /// token is cancelled or every sender is dropped.
    #[must_use]
    pub fn start(self) -> (mpsc::Sender<TurntableCommand>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            self.run(rx).await;
        });
        (tx, handle)
    }

    async fn run(&self, mut commands: mpsc::Receiver<TurntableCommand>) {
        info!(target: LOG_TARGET, "Starting turntable");

        let mut deck = Deck::default();
        let mut tick = tokio::time::interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut state_sync = tokio::time::interval(self.state_sync_interval);
        state_sync.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Turntable shutting down");
                    break;
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!(target: LOG_TARGET, "Command channel closed");
                        break;
                    };
                    self.handle_command(&mut deck, command).await;
                }
                _ = tick.tick() => {
                    self.advance(&mut deck).await;
                }
                _ = state_sync.tick() => {
                    if deck.is_playing() {
                        self.publish(&deck).await;
                    }
                }
            }
        }
    }

    async fn handle_command(&self, deck: &mut Deck, command: TurntableCommand) {
        let now = Instant::now();
        debug!(target: LOG_TARGET, "Command: {:?}", command);

        let changed = match command {
            TurntableCommand::Load(track) => {
                info!(
                    target: LOG_TARGET,
                    "Loading {} by {} ({})",
                    track.title,
                    track.artist,
                    track.duration.to_lrc_clock()
                );
                deck.load(track, self.autoplay, now);
                true
            }
            TurntableCommand::Play => deck.play(now),
            TurntableCommand::Pause => deck.pause(now),
            TurntableCommand::Toggle => {
                if deck.is_playing() {
                    deck.pause(now)
                } else {
                    deck.play(now)
                }
            }
            TurntableCommand::Seek(position) => deck.seek(position, now),
            TurntableCommand::Stop => deck.stop(),
        };

        if changed {
            self.publish(deck).await;
            self.sync_engine.tick(deck.position(now)).await;
        }
    }

    /// Handle the end of the record and refresh the lyric display
    async fn advance(&self, deck: &mut Deck) {
        let now = Instant::now();
        if deck.is_playing() && deck.at_end(now) {
            if self.repeat {
                debug!(target: LOG_TARGET, "Track ended, repeating");
                deck.seek(Duration::ZERO, now);
            } else {
                info!(target: LOG_TARGET, "Track ended");
                deck.pause(now);
            }
            self.publish(deck).await;
        }

        if deck.track.is_some() {
            self.sync_engine.tick(deck.position(now)).await;
        }
    }

    async fn publish(&self, deck: &Deck) {
        let state = PlaybackState::new(
            deck.is_playing(),
            deck.track.clone(),
            deck.position(Instant::now()),
            deck.duration(),
        );
        self.sync_engine.update_state(state).await;
    }
}
