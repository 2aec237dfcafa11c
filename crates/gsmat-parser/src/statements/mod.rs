//! Per-statement parsers, one per response family.
//!
//! Every parser takes a [`ParseContext`] and one complete response line, with
//! or without its `+KEYWORD: ` prefix. Parsers advance a [`Cursor`] token by
//! token and then decide where the result goes:
//!
//! - into the shared [`DeviceState`] only,
//! - additionally into the output slot of the [`ActiveCommand`], when its kind
//!   matches the response,
//! - and/or out as an [`Event`] for the callback layer.
//!
//! Only the list and read parsers and the SMS status matcher can fail; see
//! [`ParseError`](crate::ParseError).

mod call;
mod network;
mod phonebook;
mod sim;
mod sms;

pub use call::*;
pub use network::*;
pub use phonebook::*;
pub use sim::*;
pub use sms::*;

use tracing::debug;

use crate::command::ActiveCommand;
use crate::cursor::{Cursor, Overflow};
use crate::events::{CommandQueue, Event, EventSink};
use crate::memory::MemoryMap;
use crate::state::DeviceState;

/// Everything a statement parser may read or write.
///
/// The caller guarantees that nothing else touches `state` or `command` for
/// the duration of the call.
pub struct ParseContext<'a> {
    /// Shared device state.
    pub state: &'a mut DeviceState,
    /// The command awaiting a reply, if any.
    pub command: Option<&'a mut ActiveCommand>,
    /// Memory-identifier table of the target device.
    pub memories: &'a MemoryMap,
    /// Event destination.
    pub events: &'a mut dyn EventSink,
    /// Scheduler interface for follow-up commands.
    pub queue: &'a mut dyn CommandQueue,
}

impl<'a> ParseContext<'a> {
    /// Create a context with no active command.
    pub fn new(
        state: &'a mut DeviceState,
        memories: &'a MemoryMap,
        events: &'a mut dyn EventSink,
        queue: &'a mut dyn CommandQueue,
    ) -> Self {
        ParseContext {
            state,
            command: None,
            memories,
            events,
            queue,
        }
    }

    /// Attach the command awaiting a reply.
    pub fn with_command(mut self, command: &'a mut ActiveCommand) -> Self {
        self.command = Some(command);
        self
    }

    fn emit(&mut self, event: Event) {
        debug!(?event, "emitting event");
        self.events.emit(event);
    }
}

/// Cursor positioned after the `+KEYWORD: ` prefix, if there is one.
fn response_body(line: &str) -> Cursor<'_> {
    let mut cursor = Cursor::new(line);
    cursor.skip_response_prefix();
    cursor
}

/// Copy a text field, trimming overlong values.
fn read_text(cursor: &mut Cursor<'_>, capacity: usize, field: &'static str) -> String {
    let mut text = String::new();
    if cursor.parse_string(&mut text, capacity, Overflow::Trim).is_truncated() {
        debug!(field, capacity, "text field truncated");
    }
    text
}

/// Read a number that must fit in `u16`; out-of-range values yield 0.
fn read_u16(cursor: &mut Cursor<'_>) -> u16 {
    u16::try_from(cursor.parse_number()).unwrap_or(0)
}

/// Read a number that must fit in `u32`; negative values yield 0.
fn read_u32(cursor: &mut Cursor<'_>) -> u32 {
    u32::try_from(cursor.parse_number()).unwrap_or(0)
}
