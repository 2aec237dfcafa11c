//! Plain-text and JSON rendering of a replay.

use std::fmt::Write;

use gsmat_parser::{
    ActiveCommand, CurrentOperator, DeviceState, Event, MemoryPool, OperatorData, PhonebookEntry,
    SmsEntry, SmsPool, SubRequest,
};

use crate::error::ReplayError;
use crate::replay::ReplayOutcome;

/// Render the outcome as pretty-printed JSON.
pub fn render_json(outcome: &ReplayOutcome) -> Result<String, ReplayError> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Render the outcome as a human-readable report.
pub fn render_text(outcome: &ReplayOutcome) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, outcome);
    out
}

fn write_report(out: &mut String, outcome: &ReplayOutcome) -> std::fmt::Result {
    writeln!(
        out,
        "lines: {} (handled {}, declined {}, ignored {})",
        outcome.lines,
        outcome.handled,
        outcome.declined.len(),
        outcome.ignored()
    )?;
    for reason in &outcome.declined {
        writeln!(out, "  declined {}", reason)?;
    }

    writeln!(out, "events:")?;
    for event in &outcome.events {
        writeln!(out, "  {}", describe_event(event))?;
    }
    if !outcome.requests.is_empty() {
        let requests: Vec<_> = outcome.requests.iter().map(describe_request).collect();
        writeln!(out, "follow-ups: {}", requests.join(", "))?;
    }

    write_state(out, &outcome.state)?;
    match &outcome.command {
        Some(command) => write_command(out, command),
        None => Ok(()),
    }
}

fn write_state(out: &mut String, state: &DeviceState) -> std::fmt::Result {
    writeln!(out, "state:")?;
    writeln!(out, "  registration: {}", state.network.status.name())?;
    writeln!(out, "  operator: {}", describe_operator(&state.network.operator))?;
    writeln!(out, "  sim: {}", state.sim_state.name())?;
    for pool in SmsPool::ALL {
        writeln!(out, "  sms {:?}: {}", pool, describe_pool(state.sms_pool(pool)))?;
    }
    writeln!(out, "  phonebook: {}", describe_pool(&state.phonebook_memory))?;
    if !state.call.number.is_empty() {
        writeln!(
            out,
            "  call: #{} {:?} {:?} {}",
            state.call.id, state.call.direction, state.call.state, state.call.number
        )?;
    }
    Ok(())
}

fn write_command(out: &mut String, command: &ActiveCommand) -> std::fmt::Result {
    writeln!(out, "command {}:", command.kind())?;
    match command {
        ActiveCommand::OperatorGet { current } => match current {
            Some(current) => writeln!(out, "  {}", describe_operator(current)),
            None => writeln!(out, "  no reply"),
        },
        ActiveCommand::OperatorScan { operators } => {
            for op in operators.entries() {
                writeln!(
                    out,
                    "  {:?} {} / {} ({})",
                    op.status, op.long_name, op.short_name, op.numeric
                )?;
            }
            writeln!(out, "  {} of {} slots used", operators.len(), operators.capacity())
        }
        ActiveCommand::SmsSend { reference } => match reference {
            Some(reference) => writeln!(out, "  reference {}", reference),
            None => writeln!(out, "  no reference"),
        },
        ActiveCommand::SmsRead { entry, .. } => match entry {
            Some(entry) => writeln!(out, "  {}", describe_sms(entry)),
            None => writeln!(out, "  no reply"),
        },
        ActiveCommand::SmsList { entries, .. } => {
            for entry in entries.entries() {
                writeln!(out, "  {}", describe_sms(entry))?;
            }
            writeln!(out, "  {} of {} slots used", entries.len(), entries.capacity())
        }
        ActiveCommand::PhonebookList { entries } | ActiveCommand::PhonebookSearch { entries } => {
            for entry in entries.entries() {
                writeln!(out, "  {}", describe_contact(entry))?;
            }
            writeln!(out, "  {} of {} slots used", entries.len(), entries.capacity())
        }
        ActiveCommand::SmsMemory(shape) | ActiveCommand::PhonebookMemory(shape) => {
            writeln!(out, "  shape {:?}", shape)
        }
        ActiveCommand::RegistrationGet | ActiveCommand::SimStatusGet | ActiveCommand::Other => Ok(()),
    }
}

/// One-line description of an event.
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::NetworkRegistrationChanged(status) => format!("registration: {}", status.name()),
        Event::SimStateChanged(state) => format!("sim: {}", state.name()),
        Event::CallChanged(call) => format!("call #{}: {:?} {}", call.id, call.state, call.number),
        Event::SmsSent { reference } => format!("sms sent: reference {}", reference),
        Event::SmsReceived { memory, position } => format!("sms received: {} #{}", memory, position),
    }
}

fn describe_request(request: &SubRequest) -> String {
    match request {
        SubRequest::CurrentOperator => "current operator".to_string(),
        SubRequest::SimInfo => "sim info".to_string(),
    }
}

fn describe_operator(operator: &CurrentOperator) -> String {
    match &operator.data {
        OperatorData::None => format!("{:?}, none", operator.mode),
        OperatorData::LongName(name) | OperatorData::ShortName(name) => {
            format!("{:?}, {}", operator.mode, name)
        }
        OperatorData::Numeric(code) => format!("{:?}, {}", operator.mode, code),
    }
}

fn describe_pool(pool: &MemoryPool) -> String {
    let available: Vec<_> = pool.available.iter().map(|m| m.to_string()).collect();
    format!(
        "{} {}/{} [{}]",
        pool.current,
        pool.used,
        pool.total,
        available.join(",")
    )
}

fn describe_sms(entry: &SmsEntry) -> String {
    let status = entry.status.map_or("?", |s| s.as_phrase());
    format!(
        "{} #{} {} {} {}",
        entry.memory, entry.position, status, entry.number, entry.datetime
    )
}

fn describe_contact(entry: &PhonebookEntry) -> String {
    format!(
        "#{} {} ({:?}) {}",
        entry.position, entry.number, entry.number_type, entry.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{replay, RecordingQueue};
    use gsmat_parser::{MemoryId, MemoryMap};

    fn scan_outcome() -> ReplayOutcome {
        replay(
            b"+COPS: (2,\"Telekom.de\",\"TDG\",\"26201\"),,(0-4),(0-2)\r\nOK\r\n",
            MemoryMap::default(),
            Some(ActiveCommand::operator_scan(4)),
            RecordingQueue::default(),
        )
    }

    #[test]
    fn test_text_report_lists_operators() {
        let text = render_text(&scan_outcome());
        assert!(text.starts_with("lines: 2 (handled 1, declined 0, ignored 1)"));
        assert!(text.contains("command +COPS=?:"));
        assert!(text.contains("Current Telekom.de / TDG (26201)"));
        assert!(text.contains("1 of 4 slots used"));
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&scan_outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lines"], 2);
        assert_eq!(
            value["command"]["OperatorScan"]["operators"]["entries"][0]["numeric"],
            26201
        );
        assert_eq!(value["state"]["sim_state"], "NotReady");
    }

    #[test]
    fn test_describe_events() {
        assert_eq!(
            describe_event(&Event::SmsReceived { memory: MemoryId::Sim, position: 3 }),
            "sms received: SM #3"
        );
        assert_eq!(
            describe_event(&Event::SmsSent { reference: 9 }),
            "sms sent: reference 9"
        );
    }
}
