//! Error types for the replay tool.

use gsmat_parser::ConfigError;
use thiserror::Error;

/// Errors that can occur while replaying a transcript.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// I/O error reading the transcript.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The memory table could not be loaded.
    #[error("memory table: {0}")]
    Config(#[from] ConfigError),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `--memory` named a literal the memory table does not contain.
    #[error("unknown memory literal: {0:?}")]
    UnknownMemory(String),
}
