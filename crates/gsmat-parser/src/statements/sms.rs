//! SMS statements: status token, timestamps, `+CMGS`, `+CMTI`, `+CMGR`,
//! `+CMGL` and the storage pools of `+CPMS`.

use tracing::debug;

use super::{read_text, read_u16, read_u32, response_body, ParseContext};
use crate::command::{ActiveCommand, CommandKind, PoolShape};
use crate::cursor::{Cursor, Overflow};
use crate::error::{ParseError, ParseResult};
use crate::events::Event;
use crate::memory::MemoryId;
use crate::state::SmsPool;
use crate::types::{DateTime, SmsEntry, SmsStatus, EPOCH_YEAR, NAME_LEN, NUMBER_LEN};

/// Room for the longest status phrase plus the terminator slot.
const STATUS_LEN: usize = 16;

/// Match the status phrase of a stored message (`"REC UNREAD"`, ...).
pub fn parse_sms_status(cursor: &mut Cursor<'_>) -> ParseResult<SmsStatus> {
    let mut phrase = String::new();
    cursor.parse_string(&mut phrase, STATUS_LEN, Overflow::Trim);
    SmsStatus::from_phrase(&phrase).ok_or(ParseError::UnknownSmsStatus(phrase))
}

/// Parse a `dd/mm/yy,hh:mm:ss` timestamp, discarding any zone suffix.
pub fn parse_datetime(cursor: &mut Cursor<'_>) -> DateTime {
    let mut small = || u8::try_from(cursor.parse_number()).unwrap_or(0);
    let day = small();
    let month = small();
    let year = EPOCH_YEAR.saturating_add(u16::from(small()));
    let hours = small();
    let minutes = small();
    let seconds = small();
    cursor.skip_or_consume();
    DateTime {
        day,
        month,
        year,
        hours,
        minutes,
        seconds,
    }
}

/// Parse `+CMGS: <mr>`, the reference of a sent message.
///
/// An active send command records the reference as well.
pub fn parse_cmgs(ctx: &mut ParseContext<'_>, line: &str, send_event: bool) -> u16 {
    let mut cursor = response_body(line);
    let reference = read_u16(&mut cursor);

    if let Some(ActiveCommand::SmsSend { reference: slot }) = ctx.command.as_deref_mut() {
        *slot = Some(reference);
    }
    if send_event {
        ctx.emit(Event::SmsSent { reference });
    }
    reference
}

/// Parse `+CMTI: "<mem>",<index>`, a newly stored message.
pub fn parse_cmti(ctx: &mut ParseContext<'_>, line: &str, send_event: bool) -> (MemoryId, u16) {
    let mut cursor = response_body(line);
    let memory = cursor.parse_memory(ctx.memories);
    let position = read_u16(&mut cursor);

    if send_event {
        ctx.emit(Event::SmsReceived { memory, position });
    }
    (memory, position)
}

/// Parse the header line of `+CMGR` into the active read command's slot.
///
/// Fails when no SMS read is in flight.
pub fn parse_cmgr(ctx: &mut ParseContext<'_>, line: &str) -> ParseResult<()> {
    let Some(ActiveCommand::SmsRead { memory, position, entry }) = ctx.command.as_deref_mut() else {
        return Err(ParseError::NoActiveCommand {
            expected: CommandKind::SmsRead,
        });
    };

    let mut cursor = response_body(line);
    let mut read = SmsEntry {
        memory: *memory,
        position: *position,
        ..Default::default()
    };
    read_message(&mut cursor, &mut read);
    *entry = Some(read);
    Ok(())
}

/// Parse one `+CMGL` line into the active list command.
///
/// Fails when no SMS list is in flight or its list is full; the caller stops
/// feeding entries for that command.
pub fn parse_cmgl(ctx: &mut ParseContext<'_>, line: &str) -> ParseResult<()> {
    let Some(ActiveCommand::SmsList { memory, entries }) = ctx.command.as_deref_mut() else {
        return Err(ParseError::NoActiveCommand {
            expected: CommandKind::SmsList,
        });
    };
    if entries.is_full() {
        return Err(ParseError::ListFull {
            capacity: entries.capacity(),
        });
    }

    let mut cursor = response_body(line);
    let mut entry = SmsEntry {
        memory: *memory,
        position: read_u16(&mut cursor),
        ..Default::default()
    };
    read_message(&mut cursor, &mut entry);
    entries.push(entry)
}

/// Status, number, name and timestamp, shared by `+CMGR` and `+CMGL`.
fn read_message(cursor: &mut Cursor<'_>, entry: &mut SmsEntry) {
    entry.status = match parse_sms_status(cursor) {
        Ok(status) => Some(status),
        Err(err) => {
            debug!(%err, "message status not recognized");
            None
        }
    };
    entry.number = read_text(cursor, NUMBER_LEN, "sms_number");
    entry.name = read_text(cursor, NAME_LEN, "sms_name");
    entry.datetime = parse_datetime(cursor);
}

/// Parse `+CPMS` into the three SMS storage pools.
///
/// - [`PoolShape::Options`]: `("SM","ME"),("SM","ME"),("SM","ME")`
/// - [`PoolShape::Current`]: `"SM",10,20,"ME",2,20,"SM",10,20`
/// - [`PoolShape::Set`]: `10,20,2,20,10,20`
pub fn parse_cpms(ctx: &mut ParseContext<'_>, line: &str, shape: PoolShape) {
    let mut cursor = response_body(line);
    for pool in SmsPool::ALL {
        let slot = &mut ctx.state.sms_memory[pool.index()];
        match shape {
            PoolShape::Options => slot.available = cursor.parse_memory_set(ctx.memories),
            PoolShape::Current => {
                slot.current = cursor.parse_memory(ctx.memories);
                slot.used = read_u32(&mut cursor);
                slot.total = read_u32(&mut cursor);
            }
            PoolShape::Set => {
                slot.used = read_u32(&mut cursor);
                slot.total = read_u32(&mut cursor);
            }
        }
    }
}
