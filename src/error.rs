use thiserror::Error;

use crate::Coords;

/// Errors raised by the game core and its terminal surface.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no free tile found after {attempts} attempts")]
    SamplingExhausted { attempts: u32 },
    #[error("snake body is empty")]
    EmptySnake,
    #[error("coordinate {0:?} is outside the play area")]
    OutOfBounds(Coords),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("failed to parse config file: {0}")]
    ConfigFile(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),
}

pub type Result<T> = std::result::Result<T, GameError>;
