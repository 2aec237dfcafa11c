//! SIM state (`+CPIN`).

use tracing::{debug, warn};

use super::{response_body, ParseContext};
use crate::events::{Event, SubRequest};
use crate::types::SimState;

/// Parse a `+CPIN: <code>` line into the SIM state.
///
/// Unrecognized phrases leave the SIM [`SimState::NotReady`]. Reaching
/// [`SimState::Ready`] queues a SIM-info request.
///
/// Returns `false` only when that request could not be queued.
pub fn parse_cpin(ctx: &mut ParseContext<'_>, line: &str, send_event: bool) -> bool {
    let cursor = response_body(line);
    let sim_state = SimState::from_phrase(cursor.remaining());
    debug!(state = sim_state.name(), "SIM state");
    ctx.state.sim_state = sim_state;

    let mut queued = true;
    if sim_state.is_ready() {
        if let Err(err) = ctx.queue.enqueue(SubRequest::SimInfo) {
            warn!(%err, "could not queue SIM info request");
            queued = false;
        }
    }

    if send_event {
        ctx.emit(Event::SimStateChanged(sim_state));
    }
    queued
}
