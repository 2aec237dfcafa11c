//! Phonebook statements: storage (`+CPBS`), read (`+CPBR`) and search
//! (`+CPBF`).

use super::{read_text, read_u16, read_u32, response_body, ParseContext};
use crate::command::{ActiveCommand, CommandKind, EntryList, PoolShape};
use crate::cursor::Cursor;
use crate::error::{ParseError, ParseResult};
use crate::types::{NumberType, PhonebookEntry, NAME_LEN, NUMBER_LEN};

/// Parse `+CPBS` into the phonebook storage pool.
///
/// - [`PoolShape::Options`]: `("SM","ON","FD")`
/// - [`PoolShape::Current`]: `"SM",10,250`
/// - [`PoolShape::Set`]: `10,250`
pub fn parse_cpbs(ctx: &mut ParseContext<'_>, line: &str, shape: PoolShape) {
    let mut cursor = response_body(line);
    let pool = &mut ctx.state.phonebook_memory;
    match shape {
        PoolShape::Options => pool.available = cursor.parse_memory_set(ctx.memories),
        PoolShape::Current => {
            pool.current = cursor.parse_memory(ctx.memories);
            pool.used = read_u32(&mut cursor);
            pool.total = read_u32(&mut cursor);
        }
        PoolShape::Set => {
            pool.used = read_u32(&mut cursor);
            pool.total = read_u32(&mut cursor);
        }
    }
}

/// Parse one `+CPBR` line into the active phonebook read.
pub fn parse_cpbr(ctx: &mut ParseContext<'_>, line: &str) -> ParseResult<()> {
    match ctx.command.as_deref_mut() {
        Some(ActiveCommand::PhonebookList { entries }) => append_entry(entries, line),
        _ => Err(ParseError::NoActiveCommand {
            expected: CommandKind::PhonebookList,
        }),
    }
}

/// Parse one `+CPBF` line into the active phonebook search.
pub fn parse_cpbf(ctx: &mut ParseContext<'_>, line: &str) -> ParseResult<()> {
    match ctx.command.as_deref_mut() {
        Some(ActiveCommand::PhonebookSearch { entries }) => append_entry(entries, line),
        _ => Err(ParseError::NoActiveCommand {
            expected: CommandKind::PhonebookSearch,
        }),
    }
}

fn append_entry(entries: &mut EntryList<PhonebookEntry>, line: &str) -> ParseResult<()> {
    if entries.is_full() {
        return Err(ParseError::ListFull {
            capacity: entries.capacity(),
        });
    }
    let mut cursor = response_body(line);
    entries.push(read_entry(&mut cursor))
}

/// `<index>,"<number>",<type>,"<text>"`
fn read_entry(cursor: &mut Cursor<'_>) -> PhonebookEntry {
    let position = read_u16(cursor);
    let number = read_text(cursor, NUMBER_LEN, "phonebook_number");
    let number_type = NumberType::from_code(cursor.parse_number());
    let name = read_text(cursor, NAME_LEN, "phonebook_name");
    PhonebookEntry {
        position,
        number,
        number_type,
        name,
    }
}
