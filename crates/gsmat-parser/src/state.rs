//! Shared device state, mutated only by the statement parsers.
//!
//! A single [`DeviceState`] lives as long as the driver. Only the receiving
//! context writes to it; anyone else reading it concurrently must hold the
//! lock the surrounding scheduler owns.

use serde::Serialize;

use crate::memory::{MemoryId, MemorySet};
use crate::types::{CallInfo, CurrentOperator, RegistrationStatus, SimState};

/// Number of SMS storage pools reported by `+CPMS`.
pub const SMS_MEMORY_POOLS: usize = 3;

/// The three SMS storage roles, in the order `+CPMS` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SmsPool {
    /// Storage used for reading and deleting.
    Operation,
    /// Storage used for writing and sending.
    Sent,
    /// Storage new messages are received into.
    Receive,
}

impl SmsPool {
    /// All pools, in report order.
    pub const ALL: [SmsPool; SMS_MEMORY_POOLS] = [SmsPool::Operation, SmsPool::Sent, SmsPool::Receive];

    /// Position of this pool in a `+CPMS` line.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Usage of one storage pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryPool {
    /// Memories the modem offers for this pool.
    pub available: MemorySet,
    /// Memory currently selected.
    pub current: MemoryId,
    /// Entries in use.
    pub used: u32,
    /// Total entries.
    pub total: u32,
}

/// Network registration and operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkState {
    /// Registration status from the last `+CREG`.
    pub status: RegistrationStatus,
    /// Operator from the last `+COPS`.
    pub operator: CurrentOperator,
}

/// Everything the parsers know about the modem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    /// Network registration and operator.
    pub network: NetworkState,
    /// SIM card state.
    pub sim_state: SimState,
    /// SMS storage pools, indexed by [`SmsPool::index`].
    pub sms_memory: [MemoryPool; SMS_MEMORY_POOLS],
    /// Phonebook storage.
    pub phonebook_memory: MemoryPool,
    /// Last reported call.
    pub call: CallInfo,
}

impl DeviceState {
    /// Create a state with everything unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get one SMS storage pool.
    pub fn sms_pool(&self, pool: SmsPool) -> &MemoryPool {
        &self.sms_memory[pool.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = DeviceState::new();
        assert_eq!(state.network.status, RegistrationStatus::NotRegistered);
        assert_eq!(state.sim_state, SimState::NotReady);
        assert_eq!(state.sms_pool(SmsPool::Receive).current, MemoryId::Unknown);
        assert!(state.phonebook_memory.available.is_empty());
    }

    #[test]
    fn test_pool_order() {
        assert_eq!(SmsPool::ALL.map(SmsPool::index), [0, 1, 2]);
    }
}
