// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Snapshot accessor and in-memory state trie.
//!
//! [`ReadOnlyStateTrie`] is the only view contracts get of the global state:
//! it is fixed to the state immediately before the instruction and cannot be
//! written through. [`MemoryStateTrie`] is the in-process implementation used
//! by the executor, the replay harness and tests.
//!
//! # Determinism Invariant
//!
//! Entries are kept in a `BTreeMap` keyed by [`InstanceId`], so every walk
//! (including [`MemoryStateTrie::state_root`]) visits keys in byte order.

use std::collections::BTreeMap;

use blake3::Hasher;
use thiserror::Error;

use crate::ident::{ContractId, DarcId, Hash, InstanceId};
use crate::state_change::{StateAction, StateChange};

/// Everything the store holds for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    /// Encoded record.
    pub value: Vec<u8>,
    /// Number of updates applied since creation.
    pub version: u64,
    /// Contract-type tag.
    pub contract_id: ContractId,
    /// Ownership reference bound at creation.
    pub darc_id: DarcId,
}

/// Errors raised by the state store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// No instance lives at the requested address.
    #[error("key not set: {0}")]
    KeyNotSet(InstanceId),
    /// A create targeted an occupied address.
    #[error("instance already exists: {0}")]
    AlreadyExists(InstanceId),
}

/// Read-only snapshot accessor handed to contracts.
pub trait ReadOnlyStateTrie {
    /// Returns the full entry stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::KeyNotSet`] when nothing is stored at `key`.
    fn get_values(&self, key: &InstanceId) -> Result<StateEntry, TrieError>;

    /// Returns only the ownership reference stored at `key`.
    fn get_darc_id(&self, key: &InstanceId) -> Result<DarcId, TrieError> {
        self.get_values(key).map(|entry| entry.darc_id)
    }
}

/// In-memory state store with atomic batch commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStateTrie {
    entries: BTreeMap<InstanceId, StateEntry>,
}

impl MemoryStateTrie {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a genesis entry directly, bypassing state changes.
    pub fn seed(&mut self, key: InstanceId, entry: StateEntry) {
        self.entries.insert(key, entry);
    }

    /// Number of stored instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no instance is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if an instance lives at `key`.
    pub fn contains(&self, key: &InstanceId) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &StateEntry)> {
        self.entries.iter()
    }

    /// Commits a batch of state changes atomically.
    ///
    /// The batch is staged on a copy; the store is replaced only when every
    /// change applied cleanly, so a rejected batch leaves no trace.
    ///
    /// # Errors
    ///
    /// - [`TrieError::AlreadyExists`] for a create on an occupied address.
    /// - [`TrieError::KeyNotSet`] for an update or remove on a free address.
    pub fn apply(&mut self, changes: &[StateChange]) -> Result<(), TrieError> {
        let mut staged = self.entries.clone();
        for sc in changes {
            match sc.action {
                StateAction::Create => {
                    if staged.contains_key(&sc.instance_id) {
                        return Err(TrieError::AlreadyExists(sc.instance_id));
                    }
                    staged.insert(
                        sc.instance_id,
                        StateEntry {
                            value: sc.value.clone(),
                            version: 0,
                            contract_id: sc.contract_id.clone(),
                            darc_id: sc.darc_id,
                        },
                    );
                }
                StateAction::Update => {
                    let entry = staged
                        .get_mut(&sc.instance_id)
                        .ok_or(TrieError::KeyNotSet(sc.instance_id))?;
                    entry.value.clone_from(&sc.value);
                    entry.contract_id = sc.contract_id.clone();
                    entry.darc_id = sc.darc_id;
                    entry.version += 1;
                }
                StateAction::Remove => {
                    staged
                        .remove(&sc.instance_id)
                        .ok_or(TrieError::KeyNotSet(sc.instance_id))?;
                }
            }
        }
        self.entries = staged;
        Ok(())
    }

    /// Canonical digest of the whole store (domain `b"state:"`).
    ///
    /// Two replicas that applied the same instructions produce the same root.
    #[must_use]
    pub fn state_root(&self) -> Hash {
        let mut h = Hasher::new();
        h.update(b"state:");
        h.update(&(self.entries.len() as u64).to_le_bytes());
        for (key, entry) in &self.entries {
            h.update(key.as_bytes());
            h.update(&entry.version.to_le_bytes());
            let tag = entry.contract_id.as_str().as_bytes();
            h.update(&(tag.len() as u64).to_le_bytes());
            h.update(tag);
            h.update(entry.darc_id.as_bytes());
            h.update(&(entry.value.len() as u64).to_le_bytes());
            h.update(&entry.value);
        }
        h.finalize().into()
    }
}

impl ReadOnlyStateTrie for MemoryStateTrie {
    fn get_values(&self, key: &InstanceId) -> Result<StateEntry, TrieError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or(TrieError::KeyNotSet(*key))
    }
}
