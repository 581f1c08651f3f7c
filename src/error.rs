//! Error types for the mazerl crate

use thiserror::Error;

/// Main error type for the mazerl crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("missing maze dimensions in header line '{line}' (expected '<width> <height>')")]
    MissingDimensions { line: String },

    #[error("invalid maze dimensions {width}x{height} (both must be positive)")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("row {row} has {got} tiles, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid tile character '{character}' at ({x}, {y})")]
    InvalidTileCharacter { character: char, x: i32, y: i32 },

    #[error("position ({x}, {y}) is out of bounds for a {width}x{height} maze")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("maze has no non-terminal, traversible state to start from")]
    NoStartableState,

    #[error("slip distribution sums to {sum}, expected 1.0")]
    InvalidSlipDistribution { sum: f64 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

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
