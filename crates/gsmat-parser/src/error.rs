//! Error types for the AT response parser.

use thiserror::Error;

use crate::command::CommandKind;

/// Failures of the few parsers that can genuinely fail.
///
/// Every other parser is tolerant and reports degraded input through sentinel
/// variants instead (see [`MemoryId::Unknown`](crate::MemoryId::Unknown)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The SMS status field matched none of the known phrases.
    #[error("unknown SMS status: {0:?}")]
    UnknownSmsStatus(String),

    /// A list or read response arrived without a matching command in flight.
    #[error("no active {expected} command")]
    NoActiveCommand {
        /// The command kind the response belongs to.
        expected: CommandKind,
    },

    /// The destination list of the active command is full.
    #[error("entry list full: capacity {capacity}")]
    ListFull {
        /// Declared capacity of the destination list.
        capacity: usize,
    },
}

/// Errors reported by a [`CommandQueue`](crate::CommandQueue) when a follow-up
/// request cannot be queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The scheduler has no room for another command.
    #[error("command queue full")]
    QueueFull,

    /// The scheduler refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur when loading a memory-identifier table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the table file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML decoding error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A table entry has an empty literal, which would match any token.
    #[error("memory table entry {index} has an empty literal")]
    EmptyLiteral {
        /// Position of the offending entry.
        index: usize,
    },

    /// The table has no entries.
    #[error("memory table is empty")]
    EmptyTable,
}

/// Result type alias for the parsers that can fail.
pub type ParseResult<T> = Result<T, ParseError>;
