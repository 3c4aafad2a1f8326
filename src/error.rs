use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError
{
    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    InvalidOption(String),
    #[error("Unknown command '{0}'. Run with --help.")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
