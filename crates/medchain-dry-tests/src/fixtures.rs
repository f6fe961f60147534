// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seeded tries.
//!
//! Spawns read the ownership reference from the spawning instance, so almost
//! every test needs one instance in place before its first instruction. The
//! genesis fixture provides it.

use medchain_core::{
    make_darc_id, make_instance_id, ContractId, DarcId, InstanceId, MemoryStateTrie, StateEntry,
};

const GENESIS_LABEL: &str = "genesis";
const GENESIS_CONTRACT: &str = "darc";
/// Label the genesis ownership reference is derived from.
pub const GENESIS_DARC: &str = "genesis-darc";

/// Trie holding only the genesis instance, plus that instance's address.
pub fn genesis_trie() -> (MemoryStateTrie, InstanceId) {
    let mut builder = TrieBuilder::new();
    let id = builder.instance(GENESIS_LABEL, GENESIS_CONTRACT, b"", make_darc_id(GENESIS_DARC));
    (builder.build(), id)
}

/// Builder for tries seeded with arbitrary instances.
///
/// ```
/// use medchain_core::make_darc_id;
/// use medchain_dry_tests::TrieBuilder;
///
/// let mut builder = TrieBuilder::new();
/// let id = builder.instance("a", "accessright", b"", make_darc_id("owner"));
/// let trie = builder.build();
/// assert!(trie.contains(&id));
/// ```
#[derive(Debug, Default)]
pub struct TrieBuilder {
    trie: MemoryStateTrie,
}

impl TrieBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an instance at `make_instance_id(label)` and return its address.
    pub fn instance(
        &mut self,
        label: &str,
        contract: &str,
        value: &[u8],
        darc_id: DarcId,
    ) -> InstanceId {
        let id = make_instance_id(label);
        self.trie.seed(
            id,
            StateEntry {
                value: value.to_vec(),
                version: 0,
                contract_id: ContractId::new(contract),
                darc_id,
            },
        );
        id
    }

    /// Chainable form of [`TrieBuilder::instance`].
    pub fn with_instance(
        mut self,
        label: &str,
        contract: &str,
        value: &[u8],
        darc_id: DarcId,
    ) -> Self {
        self.instance(label, contract, value, darc_id);
        self
    }

    /// Finish building.
    pub fn build(self) -> MemoryStateTrie {
        self.trie
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use medchain_core::ReadOnlyStateTrie;

    #[test]
    fn genesis_instance_carries_genesis_darc() {
        let (trie, id) = genesis_trie();
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get_darc_id(&id).unwrap(), make_darc_id(GENESIS_DARC));
        assert_eq!(
            trie.get_values(&id).unwrap().contract_id.as_str(),
            GENESIS_CONTRACT
        );
    }

    #[test]
    fn chained_instances_accumulate() {
        let trie = TrieBuilder::new()
            .with_instance("a", "x", b"1", make_darc_id("o"))
            .with_instance("b", "y", b"2", make_darc_id("o"))
            .build();
        assert_eq!(trie.len(), 2);
    }
}
