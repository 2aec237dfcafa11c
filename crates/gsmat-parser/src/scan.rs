//! Incremental decoder for the operator list of `+COPS=?`.
//!
//! The reply can be arbitrarily long, so it is fed one byte at a time:
//!
//! ```text
//! +COPS: (2,"Long Name","Short","26201"),(1,"Other","O","26202"),,(0-4),(0-2)
//! ```
//!
//! Each bracketed record carries status, long name, short name and numeric
//! code. Two commas in a row end the operator list; the trailing mode and
//! format ranges are ignored.

use tracing::trace;

use crate::command::OperatorList;
use crate::types::{OperatorStatus, ScannedOperator, OPERATOR_NAME_LEN};

/// Field of a record the next character belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ScanField {
    #[default]
    Status,
    LongName,
    ShortName,
    Numeric,
    /// Fields past the numeric code (access technology on newer modems).
    Ignored,
}

impl ScanField {
    fn next(self) -> Self {
        match self {
            ScanField::Status => ScanField::LongName,
            ScanField::LongName => ScanField::ShortName,
            ScanField::ShortName => ScanField::Numeric,
            ScanField::Numeric | ScanField::Ignored => ScanField::Ignored,
        }
    }
}

/// Record being filled; appended to the destination only when it closes.
#[derive(Debug, Clone, Default)]
struct PendingOperator {
    status: u32,
    long_name: String,
    short_name: String,
    numeric: u32,
}

impl PendingOperator {
    fn finish(self) -> ScannedOperator {
        ScannedOperator {
            status: OperatorStatus::from_code(self.status),
            long_name: self.long_name,
            short_name: self.short_name,
            numeric: self.numeric,
        }
    }
}

/// State of one operator scan.
///
/// Owned by the caller, one per scan. [`reset`](Self::reset) it before feeding
/// the first byte of a new reply.
#[derive(Debug, Clone, Default)]
pub struct OperatorScanner {
    bracket_open: bool,
    list_ended: bool,
    field: ScanField,
    position: usize,
    previous: Option<u8>,
    pending: PendingOperator,
}

impl OperatorScanner {
    /// Create a scanner in its reset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state before a new scan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check whether the end of the operator list was seen.
    ///
    /// Everything fed after that is ignored until the next reset.
    pub fn is_list_ended(&self) -> bool {
        self.list_ended
    }

    /// Check whether a record is currently open.
    pub fn in_record(&self) -> bool {
        self.bracket_open
    }

    /// Feed one byte of the reply, writing completed records to `out`.
    pub fn feed(&mut self, ch: u8, out: &mut OperatorList) {
        if self.previous.is_none() {
            match ch {
                b' ' => return,
                b',' => self.list_ended = true,
                _ => {}
            }
        }

        if self.list_ended || out.is_full() {
            return;
        }

        if self.bracket_open {
            match ch {
                b')' if self.previous == Some(b'(') => {
                    trace!("empty operator list");
                    self.list_ended = true;
                    self.bracket_open = false;
                }
                b')' => self.close_record(out),
                b',' => {
                    self.field = self.field.next();
                    self.position = 0;
                }
                b'"' => {}
                _ => self.push_char(ch),
            }
        } else {
            match ch {
                b'(' => self.bracket_open = true,
                b',' if self.previous == Some(b',') => self.list_ended = true,
                _ => {}
            }
        }
        self.previous = Some(ch);
    }

    /// Feed a run of bytes.
    pub fn feed_all(&mut self, bytes: &[u8], out: &mut OperatorList) {
        for &ch in bytes {
            self.feed(ch, out);
        }
    }

    fn push_char(&mut self, ch: u8) {
        let pending = &mut self.pending;
        match self.field {
            ScanField::Status => {
                if ch.is_ascii_digit() {
                    pending.status = pending.status.saturating_mul(10).saturating_add(u32::from(ch - b'0'));
                }
            }
            ScanField::LongName => {
                if self.position < OPERATOR_NAME_LEN - 1 {
                    pending.long_name.push(char::from(ch));
                    self.position += 1;
                }
            }
            ScanField::ShortName => {
                if self.position < OPERATOR_NAME_LEN - 1 {
                    pending.short_name.push(char::from(ch));
                    self.position += 1;
                }
            }
            ScanField::Numeric => {
                if ch.is_ascii_digit() {
                    pending.numeric = pending.numeric.saturating_mul(10).saturating_add(u32::from(ch - b'0'));
                }
            }
            ScanField::Ignored => {}
        }
    }

    fn close_record(&mut self, out: &mut OperatorList) {
        let record = std::mem::take(&mut self.pending).finish();
        trace!(numeric = record.numeric, name = %record.long_name, "scanned operator");
        if let Err(err) = out.push(record) {
            trace!(%err, "operator record dropped");
        }
        self.bracket_open = false;
        self.field = ScanField::Status;
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str, capacity: usize) -> (OperatorScanner, OperatorList) {
        let mut scanner = OperatorScanner::new();
        let mut out = OperatorList::with_capacity(capacity);
        scanner.reset();
        for &ch in input.as_bytes() {
            scanner.feed(ch, &mut out);
        }
        (scanner, out)
    }

    #[test]
    fn test_two_records() {
        let (_, out) = scan(r#"(1,"Long Name","Short",26201),(2,"Other","O",26202)"#, 4);
        let ops = out.entries();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].status, OperatorStatus::Available);
        assert_eq!(ops[0].long_name, "Long Name");
        assert_eq!(ops[0].short_name, "Short");
        assert_eq!(ops[0].numeric, 26201);
        assert_eq!(ops[1].status, OperatorStatus::Current);
        assert_eq!(ops[1].long_name, "Other");
        assert_eq!(ops[1].short_name, "O");
        assert_eq!(ops[1].numeric, 26202);
    }

    #[test]
    fn test_empty_list() {
        let (scanner, out) = scan("()", 4);
        assert!(out.is_empty());
        assert!(scanner.is_list_ended());
    }

    #[test]
    fn test_leading_comma_means_no_operators() {
        let (scanner, out) = scan(",,(0-4),(0-2)", 4);
        assert!(out.is_empty());
        assert!(scanner.is_list_ended());
    }

    #[test]
    fn test_double_comma_ends_list() {
        let (scanner, out) = scan(r#" (3,"A","a","1"),,(0,1,2,3,4),(0,1,2)"#, 8);
        assert_eq!(out.len(), 1);
        assert_eq!(out.entries()[0].status, OperatorStatus::Forbidden);
        assert_eq!(out.entries()[0].numeric, 1);
        assert!(scanner.is_list_ended());
    }

    #[test]
    fn test_capacity_stops_scan() {
        let (_, out) = scan(r#"(1,"A","a","1"),(1,"B","b","2"),(1,"C","c","3")"#, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out.entries()[1].long_name, "B");
    }

    #[test]
    fn test_long_name_truncated() {
        let (_, out) = scan(r#"(1,"An Operator Name Far Too Long","S","9")"#, 1);
        let op = &out.entries()[0];
        assert_eq!(op.long_name.len(), OPERATOR_NAME_LEN - 1);
        assert_eq!(op.long_name, "An Operator Name Fa");
        assert_eq!(op.numeric, 9);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let (_, out) = scan(r#"(2,"Net","N","26203",7)"#, 1);
        let op = &out.entries()[0];
        assert_eq!(op.status, OperatorStatus::Current);
        assert_eq!(op.numeric, 26203);
    }

    #[test]
    fn test_split_feeding_matches_whole() {
        let input = r#"(1,"Long Name","Short",26201),(2,"Other","O",26202),,(0-4),(0-2)"#;
        let mut scanner = OperatorScanner::new();
        let mut out = OperatorList::with_capacity(4);
        let (head, tail) = input.as_bytes().split_at(17);
        scanner.feed_all(head, &mut out);
        assert!(scanner.in_record());
        scanner.feed_all(tail, &mut out);
        assert_eq!(out, scan(input, 4).1);
    }

    #[test]
    fn test_reset_clears_latched_end() {
        let mut scanner = OperatorScanner::new();
        let mut out = OperatorList::with_capacity(2);
        scanner.feed_all(b"()", &mut out);
        assert!(scanner.is_list_ended());

        scanner.reset();
        scanner.feed_all(br#"(1,"A","a","5")"#, &mut out);
        assert_eq!(out.len(), 1);
        assert!(!scanner.is_list_ended());
    }
}
