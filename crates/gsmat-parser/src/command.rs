//! The command currently awaiting a reply, and its typed output slot.
//!
//! The scheduler installs an [`ActiveCommand`] when it sends a command and
//! takes it back when the command completes. Parsers only write into the slot
//! when the command's kind matches the response they are parsing.

use std::fmt;

use serde::Serialize;

use crate::error::{ParseError, ParseResult};
use crate::memory::MemoryId;
use crate::types::{CurrentOperator, PhonebookEntry, ScannedOperator, SmsEntry};

/// Kind tag of an in-flight command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommandKind {
    /// `AT+CREG?`
    RegistrationGet,
    /// `AT+CPIN?`
    SimStatusGet,
    /// `AT+COPS?`
    OperatorGet,
    /// `AT+COPS=?`
    OperatorScan,
    /// `AT+CMGS`
    SmsSend,
    /// `AT+CMGR`
    SmsRead,
    /// `AT+CMGL`
    SmsList,
    /// `AT+CPMS=?`, `AT+CPMS?` or `AT+CPMS=...`
    SmsMemory,
    /// `AT+CPBS=?`, `AT+CPBS?` or `AT+CPBS=...`
    PhonebookMemory,
    /// `AT+CPBR`
    PhonebookList,
    /// `AT+CPBF`
    PhonebookSearch,
    /// Any command whose replies need no slot.
    Other,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::RegistrationGet => "+CREG?",
            CommandKind::SimStatusGet => "+CPIN?",
            CommandKind::OperatorGet => "+COPS?",
            CommandKind::OperatorScan => "+COPS=?",
            CommandKind::SmsSend => "+CMGS",
            CommandKind::SmsRead => "+CMGR",
            CommandKind::SmsList => "+CMGL",
            CommandKind::SmsMemory => "+CPMS",
            CommandKind::PhonebookMemory => "+CPBS",
            CommandKind::PhonebookList => "+CPBR",
            CommandKind::PhonebookSearch => "+CPBF",
            CommandKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Which of the three memory-pool response shapes to expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PoolShape {
    /// `=?`: lists of available memories per pool.
    Options,
    /// `?`: current memory with used/total per pool.
    #[default]
    Current,
    /// `=`: used/total per pool after selecting memories.
    Set,
}

/// A capacity-bounded destination for list responses.
///
/// The length doubles as the write cursor; entries already written are never
/// touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryList<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T> EntryList<T> {
    /// Create an empty list that accepts at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        EntryList {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Declared capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether the list can take no more entries.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Append an entry, failing once the capacity is reached.
    pub fn push(&mut self, entry: T) -> ParseResult<()> {
        if self.is_full() {
            return Err(ParseError::ListFull {
                capacity: self.capacity,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// The entries written so far.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Take the entries out of the list.
    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }
}

/// Operators collected by an operator scan.
pub type OperatorList = EntryList<ScannedOperator>;

/// The in-flight command and its output slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ActiveCommand {
    /// Registration query; its reply echoes the `<n>` field.
    RegistrationGet,
    /// SIM state query.
    SimStatusGet,
    /// Current operator query.
    OperatorGet {
        /// Copy of the operator once the reply is parsed.
        current: Option<CurrentOperator>,
    },
    /// Operator scan.
    OperatorScan {
        /// Scanned operators.
        operators: OperatorList,
    },
    /// Send an SMS.
    SmsSend {
        /// Message reference the modem assigned.
        reference: Option<u16>,
    },
    /// Read one SMS.
    SmsRead {
        /// Storage being read.
        memory: MemoryId,
        /// Index being read.
        position: u16,
        /// The entry once the reply is parsed.
        entry: Option<SmsEntry>,
    },
    /// List SMS entries.
    SmsList {
        /// Storage being listed; copied into every entry.
        memory: MemoryId,
        /// Listed entries.
        entries: EntryList<SmsEntry>,
    },
    /// SMS storage query or selection.
    SmsMemory(PoolShape),
    /// Phonebook storage query or selection.
    PhonebookMemory(PoolShape),
    /// Read a range of phonebook entries.
    PhonebookList {
        /// Read entries.
        entries: EntryList<PhonebookEntry>,
    },
    /// Search the phonebook.
    PhonebookSearch {
        /// Matching entries.
        entries: EntryList<PhonebookEntry>,
    },
    /// A command whose replies need no slot.
    Other,
}

impl ActiveCommand {
    /// Start an operator scan accepting up to `capacity` operators.
    pub fn operator_scan(capacity: usize) -> Self {
        ActiveCommand::OperatorScan {
            operators: OperatorList::with_capacity(capacity),
        }
    }

    /// Start an SMS listing of `memory` accepting up to `capacity` entries.
    pub fn sms_list(memory: MemoryId, capacity: usize) -> Self {
        ActiveCommand::SmsList {
            memory,
            entries: EntryList::with_capacity(capacity),
        }
    }

    /// Start a phonebook read accepting up to `capacity` entries.
    pub fn phonebook_list(capacity: usize) -> Self {
        ActiveCommand::PhonebookList {
            entries: EntryList::with_capacity(capacity),
        }
    }

    /// Start a phonebook search accepting up to `capacity` entries.
    pub fn phonebook_search(capacity: usize) -> Self {
        ActiveCommand::PhonebookSearch {
            entries: EntryList::with_capacity(capacity),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> CommandKind {
        match self {
            ActiveCommand::RegistrationGet => CommandKind::RegistrationGet,
            ActiveCommand::SimStatusGet => CommandKind::SimStatusGet,
            ActiveCommand::OperatorGet { .. } => CommandKind::OperatorGet,
            ActiveCommand::OperatorScan { .. } => CommandKind::OperatorScan,
            ActiveCommand::SmsSend { .. } => CommandKind::SmsSend,
            ActiveCommand::SmsRead { .. } => CommandKind::SmsRead,
            ActiveCommand::SmsList { .. } => CommandKind::SmsList,
            ActiveCommand::SmsMemory(_) => CommandKind::SmsMemory,
            ActiveCommand::PhonebookMemory(_) => CommandKind::PhonebookMemory,
            ActiveCommand::PhonebookList { .. } => CommandKind::PhonebookList,
            ActiveCommand::PhonebookSearch { .. } => CommandKind::PhonebookSearch,
            ActiveCommand::Other => CommandKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_list_capacity() {
        let mut list = EntryList::with_capacity(2);
        assert!(list.push(1).is_ok());
        assert!(list.push(2).is_ok());
        assert!(list.is_full());
        assert_eq!(list.push(3), Err(ParseError::ListFull { capacity: 2 }));
        assert_eq!(list.entries(), &[1, 2]);
    }

    #[test]
    fn test_zero_capacity_list_is_full() {
        let mut list: EntryList<u8> = EntryList::with_capacity(0);
        assert!(list.is_full());
        assert!(list.push(1).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ActiveCommand::operator_scan(4).kind(), CommandKind::OperatorScan);
        assert_eq!(ActiveCommand::sms_list(MemoryId::Sim, 4).kind(), CommandKind::SmsList);
        assert_eq!(ActiveCommand::SmsMemory(PoolShape::Set).kind(), CommandKind::SmsMemory);
        assert_eq!(CommandKind::PhonebookList.to_string(), "+CPBR");
    }
}
