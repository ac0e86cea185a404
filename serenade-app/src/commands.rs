use serenade_core::secs_to_duration;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const HELP: &str = "commands: n/next (switch theme), p/pause/play (toggle), \
s/seek <seconds>, r/restart, i/status, q/quit";

/// A line typed on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextTheme,
    Toggle,
    Seek(Duration),
    Restart,
    Status,
    Quit,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'h' for help)")]
    Unknown(String),

    #[error("seek needs a number of seconds, got '{0}'")]
    InvalidSeek(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next();

        match verb.as_str() {
            "n" | "next" => Ok(Self::NextTheme),
            "p" | "pause" | "play" => Ok(Self::Toggle),
            "r" | "restart" => Ok(Self::Restart),
            "i" | "info" | "status" => Ok(Self::Status),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            "h" | "help" | "?" => Ok(Self::Help),
            "s" | "seek" => {
                let raw = arg.unwrap_or_default();
                match raw.parse::<f64>() {
                    Ok(secs) if secs.is_finite() && secs >= 0.0 => {
                        Ok(Self::Seek(secs_to_duration(secs)))
                    }
                    _ => Err(CommandError::InvalidSeek(raw.to_string())),
                }
            }
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}
