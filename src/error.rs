//! Error types for loading decks and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a scene deck.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The deck lists no rounds
    #[error("Scene deck contains no rounds")]
    Empty,

    /// A round failed validation
    #[error("Invalid round {index}: {message}")]
    InvalidRound { index: usize, message: String },
}

/// Errors that can occur while loading the game configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
