// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State-change records returned by contracts.
//!
//! Contracts never write to the state store. They return an ordered batch of
//! [`StateChange`]s, and the engine commits the whole batch atomically after
//! consensus (see [`crate::MemoryStateTrie::apply`]).

use crate::ident::{ContractId, DarcId, Hash, InstanceId};

/// Kind of mutation a state change requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateAction {
    /// Create a new instance; the address must be free.
    Create,
    /// Replace the value of an existing instance.
    Update,
    /// Remove an existing instance.
    Remove,
}

/// Request to create, update or remove one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Requested mutation.
    pub action: StateAction,
    /// Target address.
    pub instance_id: InstanceId,
    /// Contract-type tag of the instance.
    pub contract_id: ContractId,
    /// Encoded record (empty for [`StateAction::Remove`]).
    pub value: Vec<u8>,
    /// Ownership reference carried through unchanged.
    pub darc_id: DarcId,
}

impl StateChange {
    /// Builds a state change.
    pub fn new(
        action: StateAction,
        instance_id: InstanceId,
        contract_id: ContractId,
        value: Vec<u8>,
        darc_id: DarcId,
    ) -> Self {
        Self {
            action,
            instance_id,
            contract_id,
            value,
            darc_id,
        }
    }
}

/// One unit of the opaque resource bucket passed through every contract call.
///
/// Contracts in this workspace accept and return coins unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coin {
    /// Coin denomination.
    pub name: Hash,
    /// Amount held.
    pub value: u64,
}
