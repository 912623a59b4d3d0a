use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read corpus at {path}: {reason}")]
    CorpusRead { path: PathBuf, reason: String },

    #[error("Retrieval engine is not initialized")]
    EmptyCorpus,

    #[error("Device state at {path} is corrupt: {reason}")]
    StateCorrupt { path: PathBuf, reason: String },

    #[error("Failed to write device state to {path}: {reason}")]
    StateWrite { path: PathBuf, reason: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
