//! Error types for the naive-Bayes tic-tac-toe crate

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid training record at game {game}: field '{field}' has invalid value '{value}'")]
    InvalidRecord {
        game: usize,
        field: String,
        value: String,
    },

    #[error("invalid training record at game {game}: expected {expected} positions, got {got}")]
    InvalidPositionCount {
        game: usize,
        expected: usize,
        got: usize,
    },

    #[error("board string has wrong length: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid player '{player}' (expected 'X' or 'O')")]
    InvalidPlayer { player: String },

    #[error("no legal move: every position on the board is occupied")]
    NoLegalMove,

    #[error("position {position} is occupied")]
    OccupiedPosition { position: usize },

    #[error("position {position} is out of bounds (must be 1-9)")]
    InvalidPosition { position: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("posterior has no retained samples")]
    EmptyPosterior,

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
