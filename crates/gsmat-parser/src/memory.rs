//! Storage-pool identifiers and the device-specific table that maps their
//! literal names (`"SM"`, `"ME"`, ...) onto [`MemoryId`] values.
//!
//! Matching is first-match-wins in table order, not longest-prefix, so a
//! table must list `"SM_P"` before `"SM"`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// A storage pool on the modem for SMS or phonebook entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryId {
    /// SIM storage (`SM`).
    Sim,
    /// SIM storage, preferred slot (`SM_P`).
    SimPreferred,
    /// Device storage (`ME`).
    Device,
    /// Device storage, preferred slot (`ME_P`).
    DevicePreferred,
    /// Device and SIM combined (`MT`).
    DeviceOrSim,
    /// Broadcast messages (`BM`).
    Broadcast,
    /// Status reports (`SR`).
    StatusReport,
    /// Own numbers (`ON`).
    OwnNumbers,
    /// Emergency numbers (`EN`).
    Emergency,
    /// Fixed dialing numbers (`FD`).
    FixedDialing,
    /// Dialed calls (`DC`).
    DialedCalls,
    /// Last dialed numbers (`LD`).
    LastDialed,
    /// Missed calls (`MC`).
    MissedCalls,
    /// Received calls (`RC`).
    ReceivedCalls,
    /// The token matched no entry of the memory table.
    #[default]
    Unknown,
}

impl MemoryId {
    /// Every identifier, in bit order.
    pub const ALL: [MemoryId; 15] = [
        MemoryId::Sim,
        MemoryId::SimPreferred,
        MemoryId::Device,
        MemoryId::DevicePreferred,
        MemoryId::DeviceOrSim,
        MemoryId::Broadcast,
        MemoryId::StatusReport,
        MemoryId::OwnNumbers,
        MemoryId::Emergency,
        MemoryId::FixedDialing,
        MemoryId::DialedCalls,
        MemoryId::LastDialed,
        MemoryId::MissedCalls,
        MemoryId::ReceivedCalls,
        MemoryId::Unknown,
    ];

    /// The bit this identifier occupies in a [`MemorySet`].
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// A set of [`MemoryId`]s, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MemorySet(u32);

impl MemorySet {
    /// Create an empty set.
    pub fn empty() -> Self {
        MemorySet(0)
    }

    /// Get the raw bitmask.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Add an identifier to the set.
    pub fn insert(&mut self, memory: MemoryId) {
        self.0 |= memory.bit();
    }

    /// Check whether the set contains an identifier.
    pub fn contains(&self, memory: MemoryId) -> bool {
        self.0 & memory.bit() != 0
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the identifiers in the set, in bit order.
    pub fn iter(&self) -> impl Iterator<Item = MemoryId> + '_ {
        MemoryId::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<MemoryId> for MemorySet {
    fn from_iter<I: IntoIterator<Item = MemoryId>>(iter: I) -> Self {
        let mut set = MemorySet::empty();
        for memory in iter {
            set.insert(memory);
        }
        set
    }
}

impl Serialize for MemorySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// One row of the memory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMapEntry {
    /// Literal the modem prints, without quotes.
    pub literal: String,
    /// Identifier the literal maps to.
    pub memory: MemoryId,
}

/// Ordered `(literal, identifier)` table for the target device.
///
/// # YAML format
///
/// ```yaml
/// memories:
///   - literal: SM_P
///     memory: sim_preferred
///   - literal: SM
///     memory: sim
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMemoryMap")]
pub struct MemoryMap {
    memories: Vec<MemoryMapEntry>,
}

/// Unchecked wire form of [`MemoryMap`].
#[derive(Deserialize)]
struct RawMemoryMap {
    memories: Vec<MemoryMapEntry>,
}

impl TryFrom<RawMemoryMap> for MemoryMap {
    type Error = ConfigError;

    fn try_from(raw: RawMemoryMap) -> Result<Self, Self::Error> {
        MemoryMap::new(raw.memories)
    }
}

const DEFAULT_MEMORIES: [(&str, MemoryId); 14] = [
    ("SM_P", MemoryId::SimPreferred),
    ("ME_P", MemoryId::DevicePreferred),
    ("SM", MemoryId::Sim),
    ("ME", MemoryId::Device),
    ("MT", MemoryId::DeviceOrSim),
    ("BM", MemoryId::Broadcast),
    ("SR", MemoryId::StatusReport),
    ("ON", MemoryId::OwnNumbers),
    ("EN", MemoryId::Emergency),
    ("FD", MemoryId::FixedDialing),
    ("DC", MemoryId::DialedCalls),
    ("LD", MemoryId::LastDialed),
    ("MC", MemoryId::MissedCalls),
    ("RC", MemoryId::ReceivedCalls),
];

impl Default for MemoryMap {
    fn default() -> Self {
        MemoryMap {
            memories: DEFAULT_MEMORIES
                .iter()
                .map(|&(literal, memory)| MemoryMapEntry {
                    literal: literal.to_string(),
                    memory,
                })
                .collect(),
        }
    }
}

impl MemoryMap {
    /// Build a table from entries, rejecting empty tables and empty literals.
    pub fn new(memories: Vec<MemoryMapEntry>) -> Result<Self, ConfigError> {
        let map = MemoryMap { memories };
        map.validate()?;
        Ok(map)
    }

    /// Parse a table from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawMemoryMap = serde_yaml::from_str(yaml)?;
        Self::new(raw.memories)
    }

    /// Load a table from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Build a table without validation, for exercising scanners on
    /// malformed tables.
    #[cfg(test)]
    pub(crate) fn unchecked(memories: Vec<MemoryMapEntry>) -> Self {
        MemoryMap { memories }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.memories.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        if let Some(index) = self.memories.iter().position(|e| e.literal.is_empty()) {
            return Err(ConfigError::EmptyLiteral { index });
        }
        Ok(())
    }

    /// The table rows, in match order.
    pub fn entries(&self) -> &[MemoryMapEntry] {
        &self.memories
    }

    /// Find the first entry whose literal prefixes `input`.
    ///
    /// Returns the identifier and the literal's length in bytes.
    pub fn match_prefix(&self, input: &[u8]) -> Option<(MemoryId, usize)> {
        self.memories
            .iter()
            .find(|e| input.starts_with(e.literal.as_bytes()))
            .map(|e| (e.memory, e.literal.len()))
    }

    /// Get the literal for an identifier (first occurrence).
    pub fn literal(&self, memory: MemoryId) -> Option<&str> {
        self.memories
            .iter()
            .find(|e| e.memory == memory)
            .map(|e| e.literal.as_str())
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = DEFAULT_MEMORIES
            .iter()
            .find(|(_, m)| m == self)
            .map(|(l, _)| *l)
            .unwrap_or("unknown");
        write!(f, "{}", literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_prefers_longer_literal() {
        let map = MemoryMap::default();
        assert_eq!(map.match_prefix(b"SM_P\""), Some((MemoryId::SimPreferred, 4)));
        assert_eq!(map.match_prefix(b"SM\""), Some((MemoryId::Sim, 2)));
        assert_eq!(map.match_prefix(b"XX\""), None);
    }

    #[test]
    fn test_first_match_wins_in_table_order() {
        let map = MemoryMap::new(vec![
            MemoryMapEntry { literal: "SM".to_string(), memory: MemoryId::Sim },
            MemoryMapEntry { literal: "SM_P".to_string(), memory: MemoryId::SimPreferred },
        ])
        .unwrap();
        assert_eq!(map.match_prefix(b"SM_P"), Some((MemoryId::Sim, 2)));
    }

    #[test]
    fn test_memory_set_bits() {
        let mut set = MemorySet::empty();
        set.insert(MemoryId::Sim);
        set.insert(MemoryId::Device);
        assert!(set.contains(MemoryId::Sim));
        assert!(set.contains(MemoryId::Device));
        assert!(!set.contains(MemoryId::DeviceOrSim));
        assert_eq!(set.bits(), MemoryId::Sim.bit() | MemoryId::Device.bit());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![MemoryId::Sim, MemoryId::Device]);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = "memories:\n  - literal: SM\n    memory: sim\n  - literal: ME\n    memory: device\n";
        let map = MemoryMap::from_yaml_str(yaml).unwrap();
        assert_eq!(map.entries().len(), 2);
        assert_eq!(map.match_prefix(b"ME"), Some((MemoryId::Device, 2)));
        assert_eq!(map.literal(MemoryId::Sim), Some("SM"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let original = MemoryMap::default();
        let serialized = serde_yaml::to_string(&original).unwrap();
        let deserialized = MemoryMap::from_yaml_str(&serialized).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_rejects_empty_literal() {
        let yaml = "memories:\n  - literal: SM\n    memory: sim\n  - literal: \"\"\n    memory: device\n";
        let err = MemoryMap::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyLiteral { index: 1 }));
    }

    #[test]
    fn test_rejects_empty_table() {
        let err = MemoryMap::from_yaml_str("memories: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTable));
    }

    #[test]
    fn test_deserialize_validates_table() {
        let yaml = "memories:\n  - literal: \"\"\n    memory: sim\n";
        let err = serde_yaml::from_str::<MemoryMap>(yaml).unwrap_err();
        assert!(err.to_string().contains("empty literal"), "{}", err);

        assert!(serde_yaml::from_str::<MemoryMap>("memories: []\n").is_err());

        let yaml = serde_yaml::to_string(&MemoryMap::default()).unwrap();
        let map: MemoryMap = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(map, MemoryMap::default());
    }

    #[test]
    fn test_rejects_unknown_memory_name() {
        let yaml = "memories:\n  - literal: SM\n    memory: floppy\n";
        assert!(matches!(MemoryMap::from_yaml_str(yaml), Err(ConfigError::Yaml(_))));
    }
}
