//! Forward-only cursor over a response line, and the token scanners built on it.
//!
//! Scanners consume a prefix of the remaining input and never rewind. Short or
//! garbled input degrades to defaults (0, empty text, [`MemoryId::Unknown`])
//! rather than failing, so one bad field never aborts the rest of a line.
//!
//! End of input, `\r` and `\n` all count as a line terminator, so the cursor
//! works on lines with or without their terminators stripped.

use std::net::Ipv4Addr;

use crate::memory::{MemoryId, MemoryMap, MemorySet};
use crate::types::MacAddr;

/// Outcome of copying a text field into its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldText {
    /// The whole field fit.
    Complete,
    /// The field was longer than the destination; the tail was dropped.
    Truncated,
}

impl FieldText {
    /// Check whether characters were dropped.
    pub fn is_truncated(self) -> bool {
        self == FieldText::Truncated
    }
}

/// What a string scan does once its destination is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Drop the excess but still advance to the end of the field.
    Trim,
    /// Stop at the first character that does not fit.
    Stop,
}

/// A borrowed, forward-only position in a response line.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of a line.
    pub fn new(line: &'a str) -> Self {
        Self::from_bytes(line.as_bytes())
    }

    /// Create a cursor over raw bytes.
    pub fn from_bytes(input: &'a [u8]) -> Self {
        Cursor { input, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unparsed remainder.
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Check whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Check whether the cursor sits on a line terminator or end of input.
    pub fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some(b'\r') | Some(b'\n'))
    }

    /// The current byte.
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    /// Move forward `n` bytes, stopping at end of input.
    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.input.len());
    }

    /// Consume `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip a `+KEYWORD: ` response prefix, if the line starts with one.
    pub fn skip_response_prefix(&mut self) {
        if self.peek() != Some(b'+') {
            return;
        }
        if let Some(colon) = self.remaining().iter().position(|&b| b == b':') {
            self.advance(colon + 1);
            self.eat(b' ');
        }
    }

    /// Parse a signed decimal number, or `None` if no digits follow.
    ///
    /// Skips, each at most once and in order, `"` `,` `"` `/` `:` `+` and a
    /// `-` sign, then consumes digits and one trailing comma.
    pub fn try_parse_number(&mut self) -> Option<i32> {
        self.eat(b'"');
        self.eat(b',');
        self.eat(b'"');
        self.eat(b'/');
        self.eat(b':');
        self.eat(b'+');
        let negative = self.eat(b'-');

        let mut value: i32 = 0;
        let mut digits = 0;
        while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add(i32::from(digit - b'0'));
            digits += 1;
            self.pos += 1;
        }
        self.eat(b',');

        (digits > 0).then_some(if negative { -value } else { value })
    }

    /// Parse a signed decimal number; absent digits yield 0.
    pub fn parse_number(&mut self) -> i32 {
        self.try_parse_number().unwrap_or(0)
    }

    /// Parse a hexadecimal number; absent digits yield 0.
    pub fn parse_hex_number(&mut self) -> u32 {
        self.eat(b'"');
        self.eat(b',');
        self.eat(b'"');

        let mut value: u32 = 0;
        while let Some(digit) = self.peek().and_then(|b| char::from(b).to_digit(16)) {
            value = value.saturating_mul(16).saturating_add(digit);
            self.pos += 1;
        }
        self.eat(b',');
        value
    }

    /// Copy a (possibly quoted) string field into `dest`.
    ///
    /// `capacity` includes one reserved terminator slot, so at most
    /// `capacity - 1` characters are kept. The field ends at a quote followed
    /// by a comma or line terminator, or at the line end; that quote and one
    /// comma after it are consumed.
    pub fn parse_string(&mut self, dest: &mut String, capacity: usize, overflow: Overflow) -> FieldText {
        self.scan_string(Some(dest), capacity, overflow)
    }

    /// Skip a string field without copying it.
    pub fn skip_string(&mut self) {
        self.scan_string(None, 0, Overflow::Trim);
    }

    fn scan_string(&mut self, mut dest: Option<&mut String>, capacity: usize, overflow: Overflow) -> FieldText {
        self.eat(b',');
        self.eat(b'"');
        if let Some(dest) = dest.as_mut() {
            dest.clear();
        }

        let limit = capacity.saturating_sub(1);
        let mut copied = 0;
        let mut outcome = FieldText::Complete;
        while let Some(byte) = self.peek().filter(|_| !self.at_line_end()) {
            if byte == b'"' && matches!(self.peek_next(), None | Some(b',') | Some(b'\r') | Some(b'\n')) {
                self.pos += 1;
                self.eat(b',');
                break;
            }
            if let Some(dest) = dest.as_mut() {
                if copied < limit {
                    dest.push(char::from(byte));
                    copied += 1;
                } else {
                    outcome = FieldText::Truncated;
                    if overflow == Overflow::Stop {
                        break;
                    }
                }
            }
            self.pos += 1;
        }
        outcome
    }

    /// Discard the rest of a field whose grammar is not modelled.
    ///
    /// Does nothing when the cursor already sits on a quote, a comma or a line
    /// terminator.
    pub fn skip_or_consume(&mut self) {
        if !matches!(
            self.peek(),
            None | Some(b'"') | Some(b',') | Some(b'\r') | Some(b'\n')
        ) {
            self.skip_string();
        }
    }

    /// Parse a dotted IPv4 address, optionally quoted.
    ///
    /// The separator between octets is skipped without being checked.
    pub fn parse_ip(&mut self) -> Ipv4Addr {
        self.eat(b'"');
        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            if i > 0 {
                self.advance(1);
            }
            *octet = self.parse_number().clamp(0, 255) as u8;
        }
        self.eat(b'"');
        Ipv4Addr::from(octets)
    }

    /// Parse a colon-separated MAC address, optionally quoted.
    pub fn parse_mac(&mut self) -> MacAddr {
        self.eat(b'"');
        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            if i > 0 {
                self.advance(1);
            }
            *octet = self.parse_hex_number().min(0xff) as u8;
        }
        self.eat(b'"');
        self.eat(b',');
        MacAddr(octets)
    }

    /// Parse a memory identifier such as `"SM"`.
    ///
    /// Unmatched tokens yield [`MemoryId::Unknown`] and are skipped.
    pub fn parse_memory(&mut self, map: &MemoryMap) -> MemoryId {
        self.eat(b',');
        self.eat(b'"');
        match map.match_prefix(self.remaining()) {
            Some((memory, len)) => {
                self.advance(len);
                self.eat(b'"');
                memory
            }
            None => {
                self.skip_string();
                MemoryId::Unknown
            }
        }
    }

    /// Parse a parenthesised list of memory identifiers, `("SM","ME",...)`.
    pub fn parse_memory_set(&mut self, map: &MemoryMap) -> MemorySet {
        let mut set = MemorySet::empty();
        self.eat(b',');
        self.eat(b'(');
        while !self.at_line_end() && self.peek() != Some(b')') {
            let start = self.pos;
            set.insert(self.parse_memory(map));
            if self.pos == start {
                break;
            }
        }
        self.eat(b')');
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryMapEntry;

    #[test]
    fn test_parse_number_unsigned() {
        for value in [0, 7, 42, 26201, 2_147_483_647] {
            let text = format!("{}x", value);
            let mut cursor = Cursor::new(&text);
            assert_eq!(cursor.parse_number(), value);
            assert_eq!(cursor.position(), text.len() - 1);
        }
    }

    #[test]
    fn test_parse_number_negative_and_comma() {
        let mut cursor = Cursor::new("-123,rest");
        assert_eq!(cursor.parse_number(), -123);
        assert_eq!(cursor.remaining(), b"rest");
    }

    #[test]
    fn test_parse_number_skips_leading_separators() {
        let mut cursor = Cursor::new(",\"12/03/18\"");
        assert_eq!(cursor.parse_number(), 12);
        assert_eq!(cursor.parse_number(), 3);
        assert_eq!(cursor.parse_number(), 18);
    }

    #[test]
    fn test_parse_number_without_digits() {
        let mut cursor = Cursor::new("abc");
        assert_eq!(cursor.try_parse_number(), None);
        assert_eq!(cursor.parse_number(), 0);
        assert_eq!(cursor.remaining(), b"abc");
    }

    #[test]
    fn test_parse_number_saturates() {
        let mut cursor = Cursor::new("99999999999999");
        assert_eq!(cursor.parse_number(), i32::MAX);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_parse_hex_number() {
        let mut cursor = Cursor::new("\"1aF\",next");
        assert_eq!(cursor.parse_hex_number(), 0x1af);
        assert_eq!(cursor.remaining(), b"\",next");
    }

    #[test]
    fn test_parse_string() {
        let mut cursor = Cursor::new("\"abc\",next");
        let mut dest = String::new();
        assert_eq!(cursor.parse_string(&mut dest, 10, Overflow::Trim), FieldText::Complete);
        assert_eq!(dest, "abc");
        assert_eq!(cursor.remaining(), b"next");
    }

    #[test]
    fn test_parse_string_truncates() {
        let mut cursor = Cursor::new("\"abc\",next");
        let mut dest = String::new();
        assert_eq!(cursor.parse_string(&mut dest, 2, Overflow::Trim), FieldText::Truncated);
        assert_eq!(dest, "a");
        assert_eq!(cursor.remaining(), b"next");
    }

    #[test]
    fn test_parse_string_stop_on_overflow() {
        let mut cursor = Cursor::new("\"abc\",next");
        let mut dest = String::new();
        assert!(cursor.parse_string(&mut dest, 2, Overflow::Stop).is_truncated());
        assert_eq!(dest, "a");
        assert_eq!(cursor.remaining(), b"bc\",next");
    }

    #[test]
    fn test_parse_string_keeps_inner_quotes() {
        let mut cursor = Cursor::new("\"say \"hi\" now\"");
        let mut dest = String::new();
        cursor.parse_string(&mut dest, 32, Overflow::Trim);
        assert_eq!(dest, "say \"hi\" now");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_parse_string_stops_at_terminator() {
        let mut cursor = Cursor::new("unquoted\r\n");
        let mut dest = String::new();
        cursor.parse_string(&mut dest, 32, Overflow::Trim);
        assert_eq!(dest, "unquoted");
        assert_eq!(cursor.remaining(), b"\r\n");
    }

    #[test]
    fn test_parse_empty_string() {
        let mut cursor = Cursor::new(",\"\",\"x\"");
        let mut dest = String::from("stale");
        cursor.parse_string(&mut dest, 8, Overflow::Trim);
        assert_eq!(dest, "");
        cursor.parse_string(&mut dest, 8, Overflow::Trim);
        assert_eq!(dest, "x");
    }

    #[test]
    fn test_skip_or_consume() {
        let mut cursor = Cursor::new("+04\",rest");
        cursor.skip_or_consume();
        assert_eq!(cursor.remaining(), b"rest");

        let mut cursor = Cursor::new(",rest");
        cursor.skip_or_consume();
        assert_eq!(cursor.remaining(), b",rest");
    }

    #[test]
    fn test_parse_ip() {
        let mut cursor = Cursor::new("\"10.0.12.255\",x");
        assert_eq!(cursor.parse_ip(), Ipv4Addr::new(10, 0, 12, 255));
        assert_eq!(cursor.remaining(), b",x");
    }

    #[test]
    fn test_parse_mac() {
        let mut cursor = Cursor::new("\"00:1a:2B:3c:4d:ff\",x");
        assert_eq!(cursor.parse_mac(), MacAddr([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0xff]));
        assert_eq!(cursor.remaining(), b"x");
    }

    #[test]
    fn test_parse_memory() {
        let map = MemoryMap::default();
        let mut cursor = Cursor::new("\"SM_P\",\"ME\",3");
        assert_eq!(cursor.parse_memory(&map), MemoryId::SimPreferred);
        assert_eq!(cursor.parse_memory(&map), MemoryId::Device);
        assert_eq!(cursor.parse_number(), 3);
    }

    #[test]
    fn test_parse_memory_unknown_advances() {
        let map = MemoryMap::default();
        let mut cursor = Cursor::new("\"XY\",7");
        assert_eq!(cursor.parse_memory(&map), MemoryId::Unknown);
        assert_eq!(cursor.remaining(), b"7");
        assert_eq!(cursor.parse_number(), 7);
    }

    #[test]
    fn test_parse_memory_set() {
        let map = MemoryMap::default();
        let mut cursor = Cursor::new("(\"SM\",\"ME\")");
        let set = cursor.parse_memory_set(&map);
        assert_eq!(set.bits(), MemoryId::Sim.bit() | MemoryId::Device.bit());
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_parse_memory_set_stops_without_progress() {
        let map = MemoryMap::unchecked(vec![MemoryMapEntry {
            literal: String::new(),
            memory: MemoryId::Sim,
        }]);
        let mut cursor = Cursor::new("(X)");
        let set = cursor.parse_memory_set(&map);
        assert!(set.contains(MemoryId::Sim));
        assert_eq!(cursor.remaining(), b"X)");
    }

    #[test]
    fn test_parse_memory_sets_in_sequence() {
        let map = MemoryMap::default();
        let mut cursor = Cursor::new("(\"SM\",\"ME\"),(\"MT\"),()");
        assert_eq!(cursor.parse_memory_set(&map).iter().count(), 2);
        assert!(cursor.parse_memory_set(&map).contains(MemoryId::DeviceOrSim));
        assert!(cursor.parse_memory_set(&map).is_empty());
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_skip_response_prefix() {
        let mut cursor = Cursor::new("+CREG: 0,1");
        cursor.skip_response_prefix();
        assert_eq!(cursor.remaining(), b"0,1");

        let mut cursor = Cursor::new("0,1");
        cursor.skip_response_prefix();
        assert_eq!(cursor.position(), 0);
    }
}
