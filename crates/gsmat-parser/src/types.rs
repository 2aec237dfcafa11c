//! Common types decoded from modem responses.
//!
//! Enumerations carry an explicit sentinel (`Other(code)`, `Invalid`, ...) for
//! values the modem sent that have no named variant, so "parsed as zero" and
//! "could not be interpreted" stay distinguishable.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::memory::MemoryId;

/// Capacity of operator name fields, including one reserved terminator slot.
pub const OPERATOR_NAME_LEN: usize = 20;
/// Capacity of phone number fields, including one reserved terminator slot.
pub const NUMBER_LEN: usize = 26;
/// Capacity of contact name fields, including one reserved terminator slot.
pub const NAME_LEN: usize = 20;

/// Network registration status (`+CREG`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RegistrationStatus {
    /// Not registered, not searching.
    #[default]
    NotRegistered,
    /// Registered on the home network.
    Registered,
    /// Not registered, searching for an operator.
    Searching,
    /// Registration denied.
    Denied,
    /// The modem reports the status as unknown.
    Unknown,
    /// Registered, roaming.
    RegisteredRoaming,
    /// A status code with no named variant.
    Other(i32),
}

impl RegistrationStatus {
    /// Decode a `<stat>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RegistrationStatus::NotRegistered,
            1 => RegistrationStatus::Registered,
            2 => RegistrationStatus::Searching,
            3 => RegistrationStatus::Denied,
            4 => RegistrationStatus::Unknown,
            5 => RegistrationStatus::RegisteredRoaming,
            other => RegistrationStatus::Other(other),
        }
    }

    /// Check whether the modem is attached to a network.
    pub fn is_registered(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Registered | RegistrationStatus::RegisteredRoaming
        )
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationStatus::NotRegistered => "not registered",
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Searching => "searching",
            RegistrationStatus::Denied => "denied",
            RegistrationStatus::Unknown => "unknown",
            RegistrationStatus::RegisteredRoaming => "roaming",
            RegistrationStatus::Other(_) => "unrecognized",
        }
    }
}

/// SIM card state (`+CPIN`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SimState {
    /// SIM present and unlocked.
    Ready,
    /// SIM not ready, or the state phrase was not recognized.
    #[default]
    NotReady,
    /// No SIM inserted.
    NotInserted,
    /// SIM waiting for its PIN.
    PinRequired,
    /// SIM waiting for its PUK.
    PukRequired,
}

impl SimState {
    /// Phrases in match priority order.
    const PHRASES: [(&'static [u8], SimState); 5] = [
        (b"READY", SimState::Ready),
        (b"NOT READY", SimState::NotReady),
        (b"NOT INSERTED", SimState::NotInserted),
        (b"SIM PIN", SimState::PinRequired),
        (b"SIM PUK", SimState::PukRequired),
    ];

    /// Match the start of a `+CPIN` body against the known phrases.
    ///
    /// Defaults to [`SimState::NotReady`] when nothing matches.
    pub fn from_phrase(body: &[u8]) -> Self {
        Self::PHRASES
            .iter()
            .find(|(phrase, _)| body.starts_with(phrase))
            .map(|&(_, state)| state)
            .unwrap_or(SimState::NotReady)
    }

    /// Check whether the SIM is ready.
    pub fn is_ready(&self) -> bool {
        *self == SimState::Ready
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            SimState::Ready => "ready",
            SimState::NotReady => "not ready",
            SimState::NotInserted => "not inserted",
            SimState::PinRequired => "PIN required",
            SimState::PukRequired => "PUK required",
        }
    }
}

/// Operator selection mode (`+COPS` `<mode>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OperatorMode {
    /// Automatic selection.
    #[default]
    Automatic,
    /// Manual selection.
    Manual,
    /// Deregistered from the network.
    Deregister,
    /// Only the format was set.
    FormatOnly,
    /// Manual, falling back to automatic.
    ManualAutomatic,
    /// A mode code with no named variant.
    Other(i32),
}

impl OperatorMode {
    /// Decode a `<mode>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => OperatorMode::Automatic,
            1 => OperatorMode::Manual,
            2 => OperatorMode::Deregister,
            3 => OperatorMode::FormatOnly,
            4 => OperatorMode::ManualAutomatic,
            other => OperatorMode::Other(other),
        }
    }
}

/// Which representation of the operator a `+COPS` line carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OperatorFormat {
    /// Long alphanumeric name.
    LongName,
    /// Short alphanumeric name.
    ShortName,
    /// Numeric MCC/MNC code.
    Numeric,
    /// No format field, or an unrecognized one.
    #[default]
    Invalid,
}

impl OperatorFormat {
    /// Decode a `<format>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => OperatorFormat::LongName,
            1 => OperatorFormat::ShortName,
            2 => OperatorFormat::Numeric,
            _ => OperatorFormat::Invalid,
        }
    }
}

/// Operator payload, matching [`OperatorFormat`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum OperatorData {
    /// No payload was present.
    #[default]
    None,
    /// Long alphanumeric name.
    LongName(String),
    /// Short alphanumeric name.
    ShortName(String),
    /// Numeric MCC/MNC code.
    Numeric(u32),
}

/// The operator the modem is currently using (`+COPS?`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrentOperator {
    /// Selection mode.
    pub mode: OperatorMode,
    /// Representation of `data`.
    pub format: OperatorFormat,
    /// Operator name or code.
    pub data: OperatorData,
}

/// Availability of an operator in a scan result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OperatorStatus {
    /// Status unknown.
    #[default]
    Unknown,
    /// Operator available.
    Available,
    /// Currently registered operator.
    Current,
    /// Operator forbidden.
    Forbidden,
    /// A status code with no named variant.
    Other(u32),
}

impl OperatorStatus {
    /// Decode a `<stat>` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => OperatorStatus::Unknown,
            1 => OperatorStatus::Available,
            2 => OperatorStatus::Current,
            3 => OperatorStatus::Forbidden,
            other => OperatorStatus::Other(other),
        }
    }
}

/// One operator from a `+COPS=?` scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScannedOperator {
    /// Availability.
    pub status: OperatorStatus,
    /// Long alphanumeric name.
    pub long_name: String,
    /// Short alphanumeric name.
    pub short_name: String,
    /// Numeric MCC/MNC code.
    pub numeric: u32,
}

/// Call direction (`+CLCC` `<dir>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CallDirection {
    /// Mobile originated.
    #[default]
    Originated,
    /// Mobile terminated.
    Terminated,
    /// A direction code with no named variant.
    Other(i32),
}

impl CallDirection {
    /// Decode a `<dir>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CallDirection::Originated,
            1 => CallDirection::Terminated,
            other => CallDirection::Other(other),
        }
    }
}

/// Call state (`+CLCC` `<stat>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CallState {
    /// Call in progress.
    Active,
    /// Call on hold.
    Held,
    /// Outgoing call dialing.
    Dialing,
    /// Outgoing call ringing at the remote end.
    Alerting,
    /// Incoming call ringing.
    Incoming,
    /// Incoming call waiting.
    Waiting,
    /// No call, or the call ended.
    #[default]
    Disconnected,
    /// A state code with no named variant.
    Other(i32),
}

impl CallState {
    /// Decode a `<stat>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CallState::Active,
            1 => CallState::Held,
            2 => CallState::Dialing,
            3 => CallState::Alerting,
            4 => CallState::Incoming,
            5 => CallState::Waiting,
            6 => CallState::Disconnected,
            other => CallState::Other(other),
        }
    }
}

/// Call bearer (`+CLCC` `<mode>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CallType {
    /// Voice call.
    #[default]
    Voice,
    /// Data call.
    Data,
    /// Fax call.
    Fax,
    /// A type code with no named variant.
    Other(i32),
}

impl CallType {
    /// Decode a `<mode>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CallType::Voice,
            1 => CallType::Data,
            2 => CallType::Fax,
            other => CallType::Other(other),
        }
    }
}

/// Type of address octet of a phone number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NumberType {
    /// Type not specified (129).
    #[default]
    Unspecified,
    /// International number (145).
    International,
    /// National number (161).
    National,
    /// A type code with no named variant.
    Other(i32),
}

impl NumberType {
    /// Decode a `<type>` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            129 => NumberType::Unspecified,
            145 => NumberType::International,
            161 => NumberType::National,
            other => NumberType::Other(other),
        }
    }
}

/// Current call information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallInfo {
    /// Call index.
    pub id: u8,
    /// Direction.
    pub direction: CallDirection,
    /// State.
    pub state: CallState,
    /// Bearer type.
    pub kind: CallType,
    /// Part of a multiparty call.
    pub multiparty: bool,
    /// Remote number.
    pub number: String,
    /// Type of `number`.
    pub address_type: NumberType,
    /// Phonebook name of the remote party.
    pub name: String,
}

/// SMS storage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SmsStatus {
    /// Received, not read (`REC UNREAD`).
    Unread,
    /// Received, read (`REC READ`).
    Read,
    /// Stored, not sent (`STO UNSENT`).
    Unsent,
    /// Stored, sent (`STO SENT`).
    Sent,
}

impl SmsStatus {
    const PHRASES: [(&'static str, SmsStatus); 4] = [
        ("REC UNREAD", SmsStatus::Unread),
        ("REC READ", SmsStatus::Read),
        ("STO UNSENT", SmsStatus::Unsent),
        ("STO SENT", SmsStatus::Sent),
    ];

    /// Match an exact status phrase.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::PHRASES
            .iter()
            .find(|(p, _)| *p == phrase)
            .map(|&(_, status)| status)
    }

    /// The phrase the modem uses for this status.
    pub fn as_phrase(&self) -> &'static str {
        match self {
            SmsStatus::Unread => "REC UNREAD",
            SmsStatus::Read => "REC READ",
            SmsStatus::Unsent => "STO UNSENT",
            SmsStatus::Sent => "STO SENT",
        }
    }
}

/// Year the two-digit years in SMS timestamps count from.
pub const EPOCH_YEAR: u16 = 2000;

/// Timestamp as the modem prints it: `dd/mm/yy,hh:mm:ss`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateTime {
    /// Day of month.
    pub day: u8,
    /// Month (1-12).
    pub month: u8,
    /// Full year.
    pub year: u16,
    /// Hours (0-23).
    pub hours: u8,
    /// Minutes (0-59).
    pub minutes: u8,
    /// Seconds (0-59).
    pub seconds: u8,
}

impl DateTime {
    /// Convert to a calendar date-time, if the fields form a valid one.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))?
            .and_hms_opt(
                u32::from(self.hours),
                u32::from(self.minutes),
                u32::from(self.seconds),
            )
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hours, self.minutes, self.seconds
        )
    }
}

/// One stored SMS (`+CMGR` / `+CMGL`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmsEntry {
    /// Storage the entry was read from.
    pub memory: MemoryId,
    /// Index in that storage.
    pub position: u16,
    /// Status, or `None` when the status phrase was not recognized.
    pub status: Option<SmsStatus>,
    /// Sender or recipient number.
    pub number: String,
    /// Phonebook name of the sender or recipient.
    pub name: String,
    /// Service-centre timestamp.
    pub datetime: DateTime,
}

/// One phonebook entry (`+CPBR` / `+CPBF`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhonebookEntry {
    /// Index in the phonebook storage.
    pub position: u16,
    /// Phone number.
    pub number: String,
    /// Type of `number`.
    pub number_type: NumberType,
    /// Contact name.
    pub name: String,
}

/// A 6-byte hardware address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}
