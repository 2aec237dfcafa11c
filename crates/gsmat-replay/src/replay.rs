//! Driving a session over a whole transcript.

use gsmat_parser::{
    ActiveCommand, CommandQueue, DeviceState, EnqueueError, Event, EventSink, LineOutcome,
    MemoryMap, Session, SubRequest,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Event sink that logs every event as it is emitted and keeps it.
#[derive(Debug, Default)]
pub struct LoggingSink {
    events: Vec<Event>,
}

impl LoggingSink {
    /// Events emitted so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl EventSink for LoggingSink {
    fn emit(&mut self, event: Event) {
        info!(?event, "event");
        self.events.push(event);
    }
}

/// Scheduler stand-in that records follow-up requests instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    requests: Vec<SubRequest>,
    limit: Option<usize>,
}

impl RecordingQueue {
    /// Create a queue that accepts at most `limit` requests.
    pub fn with_limit(limit: usize) -> Self {
        RecordingQueue {
            requests: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Requests accepted so far.
    pub fn requests(&self) -> &[SubRequest] {
        &self.requests
    }
}

impl CommandQueue for RecordingQueue {
    fn enqueue(&mut self, request: SubRequest) -> Result<(), EnqueueError> {
        if self.limit.is_some_and(|limit| self.requests.len() >= limit) {
            return Err(EnqueueError::QueueFull);
        }
        debug!(?request, "follow-up requested");
        self.requests.push(request);
        Ok(())
    }
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    /// Lines dispatched.
    pub lines: usize,
    /// Lines a statement parser consumed.
    pub handled: usize,
    /// Why each declined line was declined.
    pub declined: Vec<String>,
    /// Events in emission order.
    pub events: Vec<Event>,
    /// Follow-up commands the parsers asked for.
    pub requests: Vec<SubRequest>,
    /// Device state after the last line.
    pub state: DeviceState,
    /// The simulated command with its filled output slot.
    pub command: Option<ActiveCommand>,
}

impl ReplayOutcome {
    /// Lines no parser was interested in.
    pub fn ignored(&self) -> usize {
        self.lines - self.handled - self.declined.len()
    }
}

/// Replay raw transcript bytes with `active` in flight throughout.
pub fn replay(
    transcript: &[u8],
    memories: MemoryMap,
    active: Option<ActiveCommand>,
    queue: RecordingQueue,
) -> ReplayOutcome {
    let mut session = Session::new(LoggingSink::default(), queue).with_memory_map(memories);
    if let Some(command) = active {
        session.begin_command(command);
    }

    let mut outcomes = session.receive(transcript);
    if !transcript.ends_with(b"\n") && !transcript.ends_with(b"\r") {
        outcomes.extend(session.receive(b"\r\n"));
    }

    let mut handled = 0;
    let mut declined = Vec::new();
    for outcome in &outcomes {
        match outcome {
            LineOutcome::Handled(_) => handled += 1,
            LineOutcome::Declined { kind, error } => {
                warn!(%kind, %error, "line declined");
                declined.push(format!("{}: {}", kind, error));
            }
            LineOutcome::Ignored => {}
        }
    }
    info!(lines = outcomes.len(), handled, "replay finished");

    let command = session.finish_command();
    ReplayOutcome {
        lines: outcomes.len(),
        handled,
        declined,
        events: session.events().events().to_vec(),
        requests: session.queue().requests().to_vec(),
        state: session.state().clone(),
        command,
    }
}
