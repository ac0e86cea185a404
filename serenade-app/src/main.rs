mod commands;
mod console;

use crate::commands::{Command, HELP};
use crate::console::Console;
use serenade_core::{
    CoreError, FileLyricsSource, LyricsFetcher, LyricsSource, SerenadeConfig, SessionState,
    SyncEngine, SyncEvent, Theme, ThemeCatalog, Turntable, TurntableCommand,
};
use serenade_lyrics_http::HttpLyricsSource;
use std::fs::File;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_TARGET: &str = "serenade::app";
const LOG_TARGET_SYNC: &str = "serenade::sync::events";

fn main() {
    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    // Load config or create template on first run
    let config = match SerenadeConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            println!(
                "Created a new config at {}. Edit it to customize themes, then run serenade again.",
                path.display()
            );
            std::process::exit(0);
        }
        Err(CoreError::ConfigParseError(parse_error)) => {
            eprintln!(
                "Config file {} has errors:\n{parse_error}",
                SerenadeConfig::config_path().display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let catalog = match config.catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    // Command line argument, then saved session, then config default
    let requested = std::env::args().nth(1);
    let session = SessionState::load().unwrap_or_default();
    let theme = catalog
        .resolve(
            requested
                .as_deref()
                .into_iter()
                .chain(session.theme.as_deref())
                .chain(std::iter::once(config.default_theme.as_str())),
        )
        .clone();
    info!(target: LOG_TARGET, "Starting with theme '{}'", theme.id);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    runtime.block_on(run(config, catalog, theme, cancel_token));

    // The stdin reader sits on a blocking thread that never returns on its own
    runtime.shutdown_timeout(Duration::from_millis(500));
}

#[allow(clippy::too_many_lines)]
async fn run(
    config: SerenadeConfig,
    catalog: ThemeCatalog,
    mut theme: Theme,
    cancel_token: CancellationToken,
) {
    let sync_engine = SyncEngine::new(config.player.filler_text.as_str());

    let sources = create_sources(&config);
    let source_names: Vec<_> = sources.iter().map(|s| s.name()).collect();
    info!(
        target: LOG_TARGET,
        "Initialized {} lyrics source(s): {:?}",
        sources.len(),
        source_names
    );

    let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let status_console = Console::new(color);

    // Subscribe before the first record goes on so no line is missed
    let printer = tokio::spawn(print_greeting(
        sync_engine.subscribe(),
        Console::new(color),
        catalog.clone(),
        cancel_token.clone(),
    ));
    let logger = tokio::spawn(log_sync_events(Arc::clone(&sync_engine)));

    let fetcher = Arc::new(LyricsFetcher::new(
        Arc::clone(&sync_engine),
        sources,
        Some(cancel_token.clone()),
    ));
    let fetcher_handle = fetcher.start();

    let turntable = Turntable::new(
        Arc::clone(&sync_engine),
        &config.player,
        Some(cancel_token.clone()),
    );
    let (commands, turntable_handle) = turntable.start();

    if commands
        .send(TurntableCommand::Load(theme.track_info()))
        .await
        .is_err()
    {
        error!(target: LOG_TARGET, "Turntable stopped before the first track");
        cancel_token.cancel();
    }

    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            () = cancel_token.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!(target: LOG_TARGET, "stdin closed");
                // Keep playing until Ctrl+C when input is not interactive
                cancel_token.cancelled().await;
                break;
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Failed to read stdin: {}", e);
                break;
            }
        };

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Status) => {
                let track = sync_engine.current_track().await;
                let playing = sync_engine.is_playing().await;
                let position = sync_engine.current_position().await;
                println!("{}", status_console.status(track.as_ref(), playing, position));
            }
            Ok(Command::NextTheme) => {
                theme = catalog.next_after(&theme.id).clone();
                send(&commands, TurntableCommand::Load(theme.track_info())).await;
                SessionState::with_theme(&theme.id).save();
            }
            Ok(Command::Toggle) => send(&commands, TurntableCommand::Toggle).await,
            Ok(Command::Seek(position)) => send(&commands, TurntableCommand::Seek(position)).await,
            Ok(Command::Restart) => {
                send(&commands, TurntableCommand::Seek(Duration::ZERO)).await;
                send(&commands, TurntableCommand::Play).await;
            }
            Err(e) => println!("{e}"),
        }
    }

    info!(target: LOG_TARGET, "Shutting down");
    cancel_token.cancel();
    drop(commands);

    let _ = turntable_handle.await;
    let _ = fetcher_handle.await;
    let _ = printer.await;
    logger.abort();
}

fn create_sources(config: &SerenadeConfig) -> Vec<Box<dyn LyricsSource>> {
    let mut sources: Vec<Box<dyn LyricsSource>> =
        vec![Box::new(FileLyricsSource::new(config.lyrics.base_dir()))];

    match HttpLyricsSource::new(&config.lyrics) {
        Ok(source) => sources.push(Box::new(source)),
        Err(e) => error!(target: LOG_TARGET, "Failed to create HTTP lyrics source: {}", e),
    }

    sources
}

async fn send(commands: &mpsc::Sender<TurntableCommand>, command: TurntableCommand) {
    if commands.send(command).await.is_err() {
        warn!(target: LOG_TARGET, "Turntable is no longer running");
    }
}

/// Print each theme's greeting card and its lyric lines as they change
async fn print_greeting(
    mut rx: tokio::sync::broadcast::Receiver<SyncEvent>,
    mut console: Console,
    catalog: ThemeCatalog,
    cancel_token: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            () = cancel_token.cancelled() => break,
            event = rx.recv() => event,
        };

        match event {
            Ok(event) => {
                // Track ids are theme ids
                if let SyncEvent::TrackChanged { track, .. } = &event {
                    if let Ok(theme) = catalog.get(&track.id) {
                        println!("{}", console.banner(theme));
                    }
                }
                if let Some(text) = console.render(&event) {
                    println!("{text}");
                }
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                debug!(target: LOG_TARGET, "Printer missed {} sync events", n);
            }
        }
    }
}

/// Log all sync events
async fn log_sync_events(sync_engine: Arc<SyncEngine>) {
    let mut rx = sync_engine.subscribe();
    drop(sync_engine);

    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                SyncEvent::PlaybackStarted { track, position } => {
                    info!(
                        target: LOG_TARGET_SYNC,
                        "Playback started: {} - {} (at {:?})",
                        track.artist, track.title, position
                    );
                }
                SyncEvent::PlaybackPaused { position } => {
                    info!(target: LOG_TARGET_SYNC, "Playback paused at {:?}", position);
                }
                SyncEvent::PlaybackResumed { position } => {
                    info!(target: LOG_TARGET_SYNC, "Playback resumed at {:?}", position);
                }
                SyncEvent::PlaybackStopped => {
                    info!(target: LOG_TARGET_SYNC, "Playback stopped");
                }
                SyncEvent::TrackChanged { track, position } => {
                    info!(
                        target: LOG_TARGET_SYNC,
                        "Track changed: {} - {} (at {:?})",
                        track.artist, track.title, position
                    );
                }
                SyncEvent::PositionSync { position } => {
                    debug!(target: LOG_TARGET_SYNC, "Position: {:?}", position);
                }
                SyncEvent::SeekOccurred { position } => {
                    info!(target: LOG_TARGET_SYNC, "Seek to {:?}", position);
                }
                SyncEvent::LyricsLoaded {
                    track_id,
                    metadata,
                    lines,
                } => {
                    info!(
                        target: LOG_TARGET_SYNC,
                        "Lyrics loaded for {}: {} lines, {} tags",
                        track_id,
                        lines,
                        metadata.len()
                    );
                }
                SyncEvent::LyricsNotFound { track_id } => {
                    info!(target: LOG_TARGET_SYNC, "No lyrics found for {}", track_id);
                }
                SyncEvent::LineChanged { index, position, .. } => {
                    debug!(
                        target: LOG_TARGET_SYNC,
                        "Line changed to {:?} at {:?}", index, position
                    );
                }
            },
            Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                info!(target: LOG_TARGET_SYNC, "Sync event channel closed");
                break;
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                info!(target: LOG_TARGET_SYNC, "Missed {} sync events", n);
            }
        }
    }
}

/// Check if file logging is enabled by reading the config file.
/// This is done before full config loading to set up tracing first.
/// Returns `false` if config doesn't exist or can't be parsed.
fn check_file_logging_enabled() -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let Ok(content) = std::fs::read_to_string(SerenadeConfig::config_path()) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with stderr output and optional file logging.
/// Stdout is reserved for the greeting and lyrics.
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = serenade_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
