use alloc::string::String;
use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("Invalid coordinates")]
    OutOfBounds,
    #[error("Corrupt saved state: {0}")]
    CorruptState(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Number of mines ({mines}) must be less than rows x columns ({cells})")]
    TooManyMines { mines: CellCount, cells: CellCount },
}

pub type Result<T> = core::result::Result<T, GameError>;

pub(crate) fn corrupt(reason: impl Into<String>) -> GameError {
    GameError::CorruptState(reason.into())
}
