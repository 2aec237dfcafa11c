//! Line dispatcher tying the statement parsers to one modem.
//!
//! A [`Session`] owns the device state, the memory table and the command
//! awaiting a reply. Complete lines go through [`Session::handle_line`]; raw
//! receive data goes through [`Session::receive`], which frames lines and
//! switches to byte-by-byte decoding for an operator scan.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::codec::LineCodec;
use crate::command::{ActiveCommand, CommandKind, PoolShape};
use crate::cursor::Cursor;
use crate::error::{ParseError, ParseResult};
use crate::events::{CommandQueue, Event, EventSink};
use crate::memory::MemoryMap;
use crate::scan::OperatorScanner;
use crate::state::DeviceState;
use crate::statements::{self, ParseContext};

// ============================================================================
// Dispatch Table
// ============================================================================

/// Response family of a dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResponseKind {
    /// `+CREG`
    Registration,
    /// `+CPIN`
    SimStatus,
    /// `+COPS` with the current operator.
    Operator,
    /// `+COPS` while an operator scan is in flight.
    OperatorScan,
    /// `+CLCC`
    CallStatus,
    /// `+CMGS`
    SmsSent,
    /// `+CMGR`
    SmsRead,
    /// `+CMGL`
    SmsList,
    /// `+CMTI`
    SmsReceived,
    /// `+CPMS`
    SmsMemory,
    /// `+CPBS`
    PhonebookMemory,
    /// `+CPBR`
    PhonebookList,
    /// `+CPBF`
    PhonebookSearch,
}

const KEYWORDS: [(&str, ResponseKind); 12] = [
    ("+CREG", ResponseKind::Registration),
    ("+CPIN", ResponseKind::SimStatus),
    ("+COPS", ResponseKind::Operator),
    ("+CLCC", ResponseKind::CallStatus),
    ("+CMGS", ResponseKind::SmsSent),
    ("+CMGR", ResponseKind::SmsRead),
    ("+CMGL", ResponseKind::SmsList),
    ("+CMTI", ResponseKind::SmsReceived),
    ("+CPMS", ResponseKind::SmsMemory),
    ("+CPBS", ResponseKind::PhonebookMemory),
    ("+CPBR", ResponseKind::PhonebookList),
    ("+CPBF", ResponseKind::PhonebookSearch),
];

/// Line prefix after which an operator scan is decoded byte by byte.
const SCAN_PREFIX: &[u8] = b"+COPS: ";

impl ResponseKind {
    /// Look up the family of a line by its `+KEYWORD:` prefix.
    pub fn from_line(line: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| {
                line.strip_prefix(keyword)
                    .is_some_and(|rest| rest.starts_with(':'))
            })
            .map(|&(_, kind)| kind)
    }

    /// The keyword that introduces this family.
    pub fn keyword(&self) -> &'static str {
        match self {
            ResponseKind::OperatorScan => "+COPS",
            other => KEYWORDS
                .iter()
                .find(|(_, kind)| kind == other)
                .map_or("", |&(keyword, _)| keyword),
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// What became of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was parsed.
    Handled(ResponseKind),
    /// A list or read line the active command could not take.
    Declined {
        /// Family of the line.
        kind: ResponseKind,
        /// Why it was declined.
        error: ParseError,
    },
    /// Not a statement this crate parses (`OK`, `ERROR`, echoes, message text).
    Ignored,
}

impl LineOutcome {
    /// Check whether the line was parsed.
    pub fn is_handled(&self) -> bool {
        matches!(self, LineOutcome::Handled(_))
    }
}

// ============================================================================
// Session
// ============================================================================

/// Parsing state for one modem.
pub struct Session<E: EventSink, Q: CommandQueue> {
    state: DeviceState,
    memories: MemoryMap,
    command: Option<ActiveCommand>,
    scanner: OperatorScanner,
    codec: LineCodec,
    /// Bytes are going straight to the scanner until the line ends.
    scanning: bool,
    /// A registration change waits for the operator query it triggered.
    registration_pending: bool,
    events: E,
    queue: Q,
}

impl<E: EventSink, Q: CommandQueue> Session<E, Q> {
    /// Create a session with the default memory table.
    pub fn new(events: E, queue: Q) -> Self {
        Session {
            state: DeviceState::new(),
            memories: MemoryMap::default(),
            command: None,
            scanner: OperatorScanner::new(),
            codec: LineCodec::new(),
            scanning: false,
            registration_pending: false,
            events,
            queue,
        }
    }

    /// Use a device-specific memory table.
    pub fn with_memory_map(mut self, memories: MemoryMap) -> Self {
        self.memories = memories;
        self
    }

    /// Get the device state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Get the memory table.
    pub fn memory_map(&self) -> &MemoryMap {
        &self.memories
    }

    /// Get the event sink.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Get the event sink mutably, e.g. to drain it.
    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Get the command queue.
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Get the command queue mutably.
    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// Get the command awaiting a reply.
    pub fn active_command(&self) -> Option<&ActiveCommand> {
        self.command.as_ref()
    }

    /// Install the command whose reply is expected next.
    ///
    /// Returns the command it replaces, if any.
    pub fn begin_command(&mut self, command: ActiveCommand) -> Option<ActiveCommand> {
        debug!(command = %command.kind(), "command started");
        self.scanner.reset();
        self.scanning = false;
        self.command.replace(command)
    }

    /// Remove the active command, handing back its filled output slot.
    pub fn finish_command(&mut self) -> Option<ActiveCommand> {
        self.scanning = false;
        let command = self.command.take();
        if let Some(command) = &command {
            debug!(command = %command.kind(), "command finished");
        }
        command
    }

    fn active_kind(&self) -> Option<CommandKind> {
        self.command.as_ref().map(ActiveCommand::kind)
    }

    fn context(&mut self) -> ParseContext<'_> {
        ParseContext {
            state: &mut self.state,
            command: self.command.as_mut(),
            memories: &self.memories,
            events: &mut self.events,
            queue: &mut self.queue,
        }
    }

    /// Dispatch one complete line, without its terminator.
    pub fn handle_line(&mut self, line: &str) -> LineOutcome {
        trace!(line, "received line");
        let Some(mut kind) = ResponseKind::from_line(line) else {
            return LineOutcome::Ignored;
        };
        let active = self.active_kind();
        if kind == ResponseKind::Operator && active == Some(CommandKind::OperatorScan) {
            kind = ResponseKind::OperatorScan;
        }

        match self.dispatch(kind, active, line) {
            Ok(()) => LineOutcome::Handled(kind),
            Err(error) => {
                warn!(%error, keyword = kind.keyword(), "line declined");
                LineOutcome::Declined { kind, error }
            }
        }
    }

    fn dispatch(&mut self, kind: ResponseKind, active: Option<CommandKind>, line: &str) -> ParseResult<()> {
        match kind {
            ResponseKind::Registration => {
                let solicited = active == Some(CommandKind::RegistrationGet);
                if statements::parse_creg(&mut self.context(), line, solicited) {
                    self.registration_pending = false;
                    self.emit_registration();
                } else {
                    self.registration_pending = true;
                }
            }
            ResponseKind::SimStatus => {
                let unsolicited = active != Some(CommandKind::SimStatusGet);
                statements::parse_cpin(&mut self.context(), line, unsolicited);
            }
            ResponseKind::Operator => {
                statements::parse_cops(&mut self.context(), line);
                if self.registration_pending {
                    self.registration_pending = false;
                    self.emit_registration();
                }
            }
            ResponseKind::OperatorScan => {
                self.scanner.reset();
                let mut cursor = Cursor::new(line);
                cursor.skip_response_prefix();
                for &byte in cursor.remaining() {
                    self.feed_scan_byte(byte);
                }
            }
            ResponseKind::CallStatus => statements::parse_clcc(&mut self.context(), line, true),
            ResponseKind::SmsSent => {
                statements::parse_cmgs(&mut self.context(), line, true);
            }
            ResponseKind::SmsReceived => {
                statements::parse_cmti(&mut self.context(), line, true);
            }
            ResponseKind::SmsRead => statements::parse_cmgr(&mut self.context(), line)?,
            ResponseKind::SmsList => statements::parse_cmgl(&mut self.context(), line)?,
            ResponseKind::SmsMemory => {
                let shape = match &self.command {
                    Some(ActiveCommand::SmsMemory(shape)) => *shape,
                    _ => PoolShape::Current,
                };
                statements::parse_cpms(&mut self.context(), line, shape);
            }
            ResponseKind::PhonebookMemory => {
                let shape = match &self.command {
                    Some(ActiveCommand::PhonebookMemory(shape)) => *shape,
                    _ => PoolShape::Current,
                };
                statements::parse_cpbs(&mut self.context(), line, shape);
            }
            ResponseKind::PhonebookList => statements::parse_cpbr(&mut self.context(), line)?,
            ResponseKind::PhonebookSearch => statements::parse_cpbf(&mut self.context(), line)?,
        }
        Ok(())
    }

    fn emit_registration(&mut self) {
        let status = self.state.network.status;
        debug!(status = status.name(), "registration event");
        self.events.emit(Event::NetworkRegistrationChanged(status));
    }

    fn feed_scan_byte(&mut self, byte: u8) {
        if let Some(ActiveCommand::OperatorScan { operators }) = self.command.as_mut() {
            self.scanner.feed(byte, operators);
        }
    }

    /// Feed raw receive data, dispatching every line it completes.
    ///
    /// While an operator scan is active, a line starting `+COPS: ` is decoded
    /// byte by byte as it arrives instead of being buffered whole.
    pub fn receive(&mut self, data: &[u8]) -> Vec<LineOutcome> {
        let mut outcomes = Vec::new();
        for &byte in data {
            if self.scanning {
                if byte == b'\r' || byte == b'\n' {
                    self.scanning = false;
                    outcomes.push(LineOutcome::Handled(ResponseKind::OperatorScan));
                } else {
                    self.feed_scan_byte(byte);
                }
                continue;
            }

            self.codec.push(&[byte]);
            if self.active_kind() == Some(CommandKind::OperatorScan) && self.codec.buffered() == SCAN_PREFIX {
                trace!("operator scan started");
                self.codec.clear();
                self.scanner.reset();
                self.scanning = true;
                continue;
            }
            while let Some(line) = self.codec.decode_line() {
                outcomes.push(self.handle_line(&line));
            }
        }
        outcomes
    }
}

impl<E: EventSink + Default, Q: CommandQueue + Default> Default for Session<E, Q> {
    fn default() -> Self {
        Self::new(E::default(), Q::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SubRequest;
    use crate::memory::MemoryId;
    use crate::types::{OperatorData, RegistrationStatus, SimState};

    type TestSession = Session<Vec<Event>, Vec<SubRequest>>;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(ResponseKind::from_line("+CREG: 1"), Some(ResponseKind::Registration));
        assert_eq!(ResponseKind::from_line("+CPBF: 1,\"2\",129,\"x\""), Some(ResponseKind::PhonebookSearch));
        assert_eq!(ResponseKind::from_line("+CREGX: 1"), None);
        assert_eq!(ResponseKind::from_line("OK"), None);
        assert_eq!(ResponseKind::from_line("AT+CREG?"), None);
        assert_eq!(ResponseKind::OperatorScan.keyword(), "+COPS");
        assert_eq!(ResponseKind::SmsMemory.to_string(), "+CPMS");
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let mut session = TestSession::default();
        assert_eq!(session.handle_line("OK"), LineOutcome::Ignored);
        assert_eq!(session.handle_line("ERROR"), LineOutcome::Ignored);
        assert_eq!(session.handle_line("Hello world"), LineOutcome::Ignored);
        assert_eq!(session.state(), &DeviceState::new());
    }

    #[test]
    fn test_registration_waits_for_operator() {
        let mut session = TestSession::default();
        session.handle_line("+CREG: 1");
        assert!(session.events().is_empty());
        assert_eq!(session.queue(), &vec![SubRequest::CurrentOperator]);

        session.handle_line("+COPS: 0,0,\"Telekom\"");
        assert_eq!(
            session.events(),
            &vec![Event::NetworkRegistrationChanged(RegistrationStatus::Registered)]
        );
        assert_eq!(
            session.state().network.operator.data,
            OperatorData::LongName("Telekom".to_string())
        );

        session.handle_line("+COPS: 0,0,\"Telekom\"");
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn test_lost_registration_notifies_immediately() {
        let mut session = TestSession::default();
        session.handle_line("+CREG: 3");
        assert_eq!(
            session.events(),
            &vec![Event::NetworkRegistrationChanged(RegistrationStatus::Denied)]
        );
    }

    #[test]
    fn test_solicited_creg_skips_format() {
        let mut session = TestSession::default();
        session.begin_command(ActiveCommand::RegistrationGet);
        session.handle_line("+CREG: 0,3");
        assert_eq!(session.state().network.status, RegistrationStatus::Denied);
    }

    #[test]
    fn test_cpin_event_only_when_unsolicited() {
        let mut session = TestSession::default();
        session.begin_command(ActiveCommand::SimStatusGet);
        session.handle_line("+CPIN: SIM PIN");
        assert!(session.events().is_empty());
        assert_eq!(session.state().sim_state, SimState::PinRequired);
        session.finish_command();

        session.handle_line("+CPIN: READY");
        assert_eq!(session.events(), &vec![Event::SimStateChanged(SimState::Ready)]);
    }

    #[test]
    fn test_memory_shape_follows_command() {
        let mut session = TestSession::default();
        session.begin_command(ActiveCommand::SmsMemory(PoolShape::Set));
        session.handle_line("+CPMS: 4,30,4,30,4,30");
        assert_eq!(session.state().sms_memory[2].used, 4);

        session.begin_command(ActiveCommand::PhonebookMemory(PoolShape::Options));
        session.handle_line("+CPBS: (\"SM\",\"ME\")");
        assert!(session.state().phonebook_memory.available.contains(MemoryId::Device));
    }

    #[test]
    fn test_scan_line_dispatch() {
        let mut session = TestSession::default();
        session.begin_command(ActiveCommand::operator_scan(4));
        let outcome = session.handle_line("+COPS: (2,\"Net\",\"N\",\"26201\"),,(0-4),(0-2)");
        assert_eq!(outcome, LineOutcome::Handled(ResponseKind::OperatorScan));
        let Some(ActiveCommand::OperatorScan { operators }) = session.finish_command() else {
            panic!("scan command missing");
        };
        assert_eq!(operators.len(), 1);
        assert_eq!(operators.entries()[0].numeric, 26201);
    }

    #[test]
    fn test_receive_scan_in_chunks() {
        let mut session = TestSession::default();
        session.begin_command(ActiveCommand::operator_scan(4));
        let mut outcomes = session.receive(b"\r\n+COPS: (1,\"One\",\"O\",\"111\"),(");
        assert!(outcomes.is_empty());
        outcomes.extend(session.receive(b"2,\"Two\",\"T\",\"222\"),,(0-4),(0-2)\r\n\r\nOK\r\n"));
        assert_eq!(
            outcomes,
            vec![LineOutcome::Handled(ResponseKind::OperatorScan), LineOutcome::Ignored]
        );

        let Some(ActiveCommand::OperatorScan { operators }) = session.finish_command() else {
            panic!("scan command missing");
        };
        let codes: Vec<_> = operators.entries().iter().map(|op| op.numeric).collect();
        assert_eq!(codes, vec![111, 222]);
    }

    #[test]
    fn test_begin_command_replaces_previous() {
        let mut session = TestSession::default();
        assert!(session.begin_command(ActiveCommand::Other).is_none());
        assert_eq!(session.begin_command(ActiveCommand::SimStatusGet), Some(ActiveCommand::Other));
        assert_eq!(session.active_command(), Some(&ActiveCommand::SimStatusGet));
        assert_eq!(session.finish_command(), Some(ActiveCommand::SimStatusGet));
        assert!(session.active_command().is_none());
    }
}
