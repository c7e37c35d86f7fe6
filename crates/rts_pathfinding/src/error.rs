//! Error types for the pathfinding engine.
//!
//! Path requests never fail with an error: an unreachable or invalid request
//! yields an empty path. Only configuration surfaces are fallible.

use thiserror::Error;

/// Result type alias using [`PathfindingError`].
pub type Result<T> = std::result::Result<T, PathfindingError>;

/// Top-level error type for the pathfinding engine.
#[derive(Debug, Error)]
pub enum PathfindingError {
    /// Configuration text could not be decoded.
    #[error("Failed to parse pathfinder config: {message}")]
    ConfigParse {
        /// Decoder error message.
        message: String,
    },

    /// Configuration could not be encoded.
    #[error("Failed to serialize pathfinder config: {message}")]
    ConfigSerialize {
        /// Encoder error message.
        message: String,
    },

    /// Configuration decoded but holds an unusable value.
    #[error("Invalid pathfinder config: {0}")]
    InvalidConfig(String),
}
