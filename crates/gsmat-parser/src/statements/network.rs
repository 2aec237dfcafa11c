//! Network registration (`+CREG`) and current operator (`+COPS`).

use tracing::{debug, warn};

use super::{read_text, read_u32, response_body, ParseContext};
use crate::command::ActiveCommand;
use crate::events::SubRequest;
use crate::types::{
    OperatorData, OperatorFormat, OperatorMode, RegistrationStatus, OPERATOR_NAME_LEN,
};

/// Parse a `+CREG` line into the registration status.
///
/// `skip_first` drops the leading `<n>` field that the reply to `AT+CREG?`
/// echoes. When the modem is attached, a current-operator query is queued.
///
/// Returns `true` when the caller should announce the new status right away:
/// the modem is not attached, or the operator query could not be queued.
pub fn parse_creg(ctx: &mut ParseContext<'_>, line: &str, skip_first: bool) -> bool {
    let mut cursor = response_body(line);
    if skip_first {
        cursor.parse_number();
    }
    let status = RegistrationStatus::from_code(cursor.parse_number());
    if ctx.state.network.status != status {
        debug!(from = ctx.state.network.status.name(), to = status.name(), "registration changed");
    }
    ctx.state.network.status = status;

    if !status.is_registered() {
        return true;
    }
    match ctx.queue.enqueue(SubRequest::CurrentOperator) {
        Ok(()) => false,
        Err(err) => {
            warn!(%err, "could not queue operator query");
            true
        }
    }
}

/// Parse a `+COPS: <mode>[,<format>,<oper>]` line into the current operator.
///
/// An active operator query also receives a copy of the result.
pub fn parse_cops(ctx: &mut ParseContext<'_>, line: &str) {
    let mut cursor = response_body(line);
    let operator = &mut ctx.state.network.operator;

    operator.mode = OperatorMode::from_code(cursor.parse_number());
    if cursor.at_line_end() {
        operator.format = OperatorFormat::Invalid;
        operator.data = OperatorData::None;
    } else {
        operator.format = OperatorFormat::from_code(cursor.parse_number());
        operator.data = if cursor.at_line_end() {
            OperatorData::None
        } else {
            match operator.format {
                OperatorFormat::LongName => {
                    OperatorData::LongName(read_text(&mut cursor, OPERATOR_NAME_LEN, "long_name"))
                }
                OperatorFormat::ShortName => {
                    OperatorData::ShortName(read_text(&mut cursor, OPERATOR_NAME_LEN, "short_name"))
                }
                OperatorFormat::Numeric => OperatorData::Numeric(read_u32(&mut cursor)),
                OperatorFormat::Invalid => OperatorData::None,
            }
        };
    }
    debug!(?operator, "current operator");

    if let Some(ActiveCommand::OperatorGet { current }) = ctx.command.as_deref_mut() {
        *current = Some(operator.clone());
    }
}
