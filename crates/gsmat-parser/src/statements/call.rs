//! Call status (`+CLCC`).

use tracing::debug;

use super::{read_text, response_body, ParseContext};
use crate::events::Event;
use crate::types::{CallDirection, CallState, CallType, NumberType, NAME_LEN, NUMBER_LEN};

/// Parse `+CLCC: <id>,<dir>,<stat>,<mode>,<mpty>,"<number>",<type>,"<name>"`
/// into the current call.
pub fn parse_clcc(ctx: &mut ParseContext<'_>, line: &str, send_event: bool) {
    let mut cursor = response_body(line);
    let call = &mut ctx.state.call;

    call.id = u8::try_from(cursor.parse_number()).unwrap_or(0);
    call.direction = CallDirection::from_code(cursor.parse_number());
    call.state = CallState::from_code(cursor.parse_number());
    call.kind = CallType::from_code(cursor.parse_number());
    call.multiparty = cursor.parse_number() != 0;
    call.number = read_text(&mut cursor, NUMBER_LEN, "call_number");
    call.address_type = NumberType::from_code(cursor.parse_number());
    call.name = read_text(&mut cursor, NAME_LEN, "call_name");
    debug!(id = call.id, state = ?call.state, number = %call.number, "call changed");

    if send_event {
        let call = call.clone();
        ctx.emit(Event::CallChanged(call));
    }
}
