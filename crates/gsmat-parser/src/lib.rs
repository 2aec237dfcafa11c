//! GSM AT response parsing
//!
//! This crate turns the text a cellular modem emits on its AT port into
//! updates of a shared [`DeviceState`], into records written to the output
//! slot of the command that is currently awaiting a reply, and into [`Event`]s
//! for a callback layer.
//!
//! # Protocol Overview
//!
//! The modem answers commands with loosely structured ASCII lines:
//!
//! - **Solicited responses**: `+KEYWORD: field,field,...` lines that answer the
//!   in-flight command, followed by `OK` or `ERROR`
//! - **Unsolicited notifications**: the same line shape, arriving at any time
//!   (`+CREG: 1`, `+CMTI: "SM",3`, ...)
//! - **Operator scan**: `+COPS: (1,"Long","Short","26201"),(...),,(0-4),(0-2)`,
//!   which can be arbitrarily long and is decoded byte by byte
//!
//! # Layers
//!
//! - [`Cursor`]: forward-only token scanners (numbers, quoted strings,
//!   addresses, memory identifiers)
//! - [`statements`]: one parser per response family, each taking a
//!   [`ParseContext`]
//! - [`OperatorScanner`]: the incremental operator-list state machine
//! - [`Session`]: keyword dispatch over complete lines or raw bytes
//!
//! # Example
//!
//! ```rust
//! use gsmat_parser::{Event, Session, SubRequest};
//!
//! let mut session = Session::new(Vec::<Event>::new(), Vec::<SubRequest>::new());
//! session.handle_line("+CPIN: READY");
//! assert!(session.state().sim_state.is_ready());
//! ```

mod codec;
mod command;
mod cursor;
mod error;
mod events;
mod memory;
mod scan;
mod session;
mod state;
pub mod statements;
mod types;

pub use codec::*;
pub use command::*;
pub use cursor::*;
pub use error::*;
pub use events::*;
pub use memory::*;
pub use scan::*;
pub use session::*;
pub use state::*;
pub use statements::ParseContext;
pub use types::*;
