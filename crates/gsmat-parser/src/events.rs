//! Seams to the callback layer and to the command scheduler.

use serde::Serialize;

use crate::error::EnqueueError;
use crate::memory::MemoryId;
use crate::types::{CallInfo, RegistrationStatus, SimState};

/// Asynchronous notification for user callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    /// Network registration changed.
    NetworkRegistrationChanged(RegistrationStatus),
    /// SIM state changed.
    SimStateChanged(SimState),
    /// A call changed state.
    CallChanged(CallInfo),
    /// An SMS was sent.
    SmsSent {
        /// Message reference.
        reference: u16,
    },
    /// An SMS was received and stored.
    SmsReceived {
        /// Storage it was written to.
        memory: MemoryId,
        /// Index in that storage.
        position: u16,
    },
}

/// Receives events emitted by the parsers.
///
/// Delivery and queueing are up to the implementation.
pub trait EventSink {
    /// Queue an event for delivery.
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Follow-up commands the parsers ask the scheduler to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubRequest {
    /// Query the current operator, after the modem attached to a network.
    CurrentOperator,
    /// Fetch SIM details, after the SIM became ready.
    SimInfo,
}

/// The scheduler's enqueue interface.
pub trait CommandQueue {
    /// Queue a follow-up command.
    fn enqueue(&mut self, request: SubRequest) -> Result<(), EnqueueError>;
}

impl CommandQueue for Vec<SubRequest> {
    fn enqueue(&mut self, request: SubRequest) -> Result<(), EnqueueError> {
        self.push(request);
        Ok(())
    }
}
