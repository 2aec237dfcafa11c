//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gsmat_parser::{ActiveCommand, MemoryId, MemoryMap, PoolShape};

use crate::error::ReplayError;

/// Replay a captured modem transcript through the AT response parser.
#[derive(Parser, Debug)]
#[command(name = "gsmat-replay", version, about)]
pub struct Args {
    /// Transcript file, one modem line per text line; `-` reads stdin.
    pub transcript: PathBuf,

    /// YAML memory table to use instead of the built-in one.
    #[arg(long)]
    pub memory_map: Option<PathBuf>,

    /// Command assumed to be in flight for the whole transcript.
    #[arg(long, value_enum)]
    pub active: Option<ActiveArg>,

    /// Entry capacity of list and scan commands.
    #[arg(long, default_value_t = 16)]
    pub capacity: usize,

    /// Storage literal for `sms-list` and `sms-read`.
    #[arg(long, default_value = "SM")]
    pub memory: String,

    /// Message index for `sms-read`.
    #[arg(long, default_value_t = 1)]
    pub position: u16,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Commands that can be simulated with `--active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActiveArg {
    /// `AT+COPS?`
    OperatorGet,
    /// `AT+COPS=?`
    OperatorScan,
    /// `AT+CMGL`
    SmsList,
    /// `AT+CMGR`
    SmsRead,
    /// `AT+CMGS`
    SmsSend,
    /// `AT+CPBR`
    PhonebookList,
    /// `AT+CPBF`
    PhonebookSearch,
    /// `AT+CPMS=?`
    SmsMemoryOptions,
    /// `AT+CPMS?`
    SmsMemoryGet,
    /// `AT+CPMS=...`
    SmsMemorySet,
    /// `AT+CPBS=?`
    PhonebookMemoryOptions,
    /// `AT+CPBS?`
    PhonebookMemoryGet,
    /// `AT+CPBS=...`
    PhonebookMemorySet,
}

impl Args {
    /// Load the memory table named on the command line, or the default one.
    pub fn load_memory_map(&self) -> Result<MemoryMap, ReplayError> {
        match &self.memory_map {
            Some(path) => Ok(MemoryMap::from_path(path)?),
            None => Ok(MemoryMap::default()),
        }
    }

    /// Build the simulated in-flight command, if one was requested.
    pub fn active_command(&self, memories: &MemoryMap) -> Result<Option<ActiveCommand>, ReplayError> {
        let Some(active) = self.active else {
            return Ok(None);
        };
        let memory = match active {
            ActiveArg::SmsList | ActiveArg::SmsRead => resolve_memory(memories, &self.memory)?,
            _ => MemoryId::Unknown,
        };
        Ok(Some(active.to_command(self.capacity, memory, self.position)))
    }
}

impl ActiveArg {
    /// The command this argument stands for.
    pub fn to_command(self, capacity: usize, memory: MemoryId, position: u16) -> ActiveCommand {
        match self {
            ActiveArg::OperatorGet => ActiveCommand::OperatorGet { current: None },
            ActiveArg::OperatorScan => ActiveCommand::operator_scan(capacity),
            ActiveArg::SmsList => ActiveCommand::sms_list(memory, capacity),
            ActiveArg::SmsRead => ActiveCommand::SmsRead {
                memory,
                position,
                entry: None,
            },
            ActiveArg::SmsSend => ActiveCommand::SmsSend { reference: None },
            ActiveArg::PhonebookList => ActiveCommand::phonebook_list(capacity),
            ActiveArg::PhonebookSearch => ActiveCommand::phonebook_search(capacity),
            ActiveArg::SmsMemoryOptions => ActiveCommand::SmsMemory(PoolShape::Options),
            ActiveArg::SmsMemoryGet => ActiveCommand::SmsMemory(PoolShape::Current),
            ActiveArg::SmsMemorySet => ActiveCommand::SmsMemory(PoolShape::Set),
            ActiveArg::PhonebookMemoryOptions => ActiveCommand::PhonebookMemory(PoolShape::Options),
            ActiveArg::PhonebookMemoryGet => ActiveCommand::PhonebookMemory(PoolShape::Current),
            ActiveArg::PhonebookMemorySet => ActiveCommand::PhonebookMemory(PoolShape::Set),
        }
    }
}

/// Look up a literal that must match a table entry exactly.
fn resolve_memory(memories: &MemoryMap, literal: &str) -> Result<MemoryId, ReplayError> {
    memories
        .entries()
        .iter()
        .find(|entry| entry.literal == literal)
        .map(|entry| entry.memory)
        .ok_or_else(|| ReplayError::UnknownMemory(literal.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsmat_parser::CommandKind;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["gsmat-replay", "boot.log"]).unwrap();
        assert_eq!(args.transcript, PathBuf::from("boot.log"));
        assert_eq!(args.capacity, 16);
        assert!(!args.json);
        assert!(args.active_command(&MemoryMap::default()).unwrap().is_none());
    }

    #[test]
    fn test_active_sms_list() {
        let args = Args::try_parse_from([
            "gsmat-replay",
            "-",
            "--active",
            "sms-list",
            "--memory",
            "ME",
            "--capacity",
            "4",
        ])
        .unwrap();
        let command = args.active_command(&MemoryMap::default()).unwrap();
        assert_eq!(command, Some(ActiveCommand::sms_list(MemoryId::Device, 4)));
    }

    #[test]
    fn test_memory_literal_must_match_exactly() {
        let args = Args::try_parse_from(["gsmat-replay", "-", "--active", "sms-read", "--memory", "S"]).unwrap();
        let err = args.active_command(&MemoryMap::default()).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownMemory(ref literal) if literal == "S"));
    }

    #[test]
    fn test_every_active_arg_maps_to_a_command() {
        let expected = [
            (ActiveArg::OperatorGet, CommandKind::OperatorGet),
            (ActiveArg::OperatorScan, CommandKind::OperatorScan),
            (ActiveArg::SmsList, CommandKind::SmsList),
            (ActiveArg::SmsRead, CommandKind::SmsRead),
            (ActiveArg::SmsSend, CommandKind::SmsSend),
            (ActiveArg::PhonebookList, CommandKind::PhonebookList),
            (ActiveArg::PhonebookSearch, CommandKind::PhonebookSearch),
            (ActiveArg::SmsMemoryOptions, CommandKind::SmsMemory),
            (ActiveArg::SmsMemoryGet, CommandKind::SmsMemory),
            (ActiveArg::SmsMemorySet, CommandKind::SmsMemory),
            (ActiveArg::PhonebookMemoryOptions, CommandKind::PhonebookMemory),
            (ActiveArg::PhonebookMemoryGet, CommandKind::PhonebookMemory),
            (ActiveArg::PhonebookMemorySet, CommandKind::PhonebookMemory),
        ];
        assert_eq!(expected.len(), ActiveArg::value_variants().len());
        for (arg, kind) in expected {
            assert_eq!(arg.to_command(2, MemoryId::Sim, 1).kind(), kind);
        }
    }
}
