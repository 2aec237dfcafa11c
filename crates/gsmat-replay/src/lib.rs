//! Transcript replay for the AT response parser.
//!
//! Feeds a captured modem transcript through a [`gsmat_parser::Session`] as if
//! it had arrived on the serial port, then reports the resulting device state,
//! the filled command slot and every emitted event.

pub mod cli;
pub mod error;
pub mod replay;
pub mod report;

pub use cli::{ActiveArg, Args};
pub use error::ReplayError;
pub use replay::{replay, LoggingSink, RecordingQueue, ReplayOutcome};
