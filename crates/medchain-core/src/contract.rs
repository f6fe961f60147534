// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contract dispatch surface and registry.
//!
//! A contract is a pure function of `(stored value, instruction)` to
//! `(state changes, error)`. Implementations must not read clocks, draw
//! randomness, spawn threads or perform I/O: every validating replica runs the
//! same call and must reach byte-identical results.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::ContractError;
use crate::ident::{ContractId, Hash};
use crate::instruction::Instruction;
use crate::state_change::{Coin, StateChange};
use crate::trie::ReadOnlyStateTrie;

/// Successful result of a lifecycle call: the batch to commit and the
/// (unmodified) resource bucket.
pub type ContractOutput = (Vec<StateChange>, Vec<Coin>);

/// Options forwarded to the ownership verifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationOptions {
    /// Skip replay-protection counter checks.
    pub ignore_counters: bool,
}

/// Ownership-document subsystem as seen by contracts.
///
/// Implementations check signatures and evaluate the ownership document that
/// governs the instruction's target against `snapshot`. Contracts never do
/// either themselves; they only choose which [`VerificationOptions`] apply.
pub trait InstructionVerifier {
    /// Verifies `inst` against `snapshot` in the context of `ctx_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Verification`] (or a propagated lookup error)
    /// when the instruction is not authorized.
    fn verify(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        ctx_hash: &Hash,
        options: VerificationOptions,
    ) -> Result<(), ContractError>;
}

/// Lifecycle operations the engine dispatches to a contract.
pub trait Contract {
    /// Contract-type tag this implementation serves.
    fn contract_id(&self) -> ContractId;

    /// Creates a new instance.
    fn spawn(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError>;

    /// Runs a command against the target instance.
    fn invoke(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError>;

    /// Removes the target instance.
    fn delete(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError>;

    /// Verifies an instruction whose execution was deferred pending further
    /// signatures.
    ///
    /// The default runs full verification, replay counters included.
    fn verify_deferred_instruction(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        ctx_hash: &Hash,
        verifier: &dyn InstructionVerifier,
    ) -> Result<(), ContractError> {
        verifier.verify(snapshot, inst, ctx_hash, VerificationOptions::default())
    }
}

/// Builds a stateless contract handle.
///
/// Contracts read and decode the stored blob inside the operation that needs
/// it, through the snapshot, so a delete never decodes anything.
pub type ContractFactory = fn() -> Box<dyn Contract>;

/// Errors raised while registering contracts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A factory is already registered under this tag.
    #[error("contract already registered: {0}")]
    Duplicate(ContractId),
}

/// Maps contract-type tags to factories.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    factories: BTreeMap<ContractId, ContractFactory>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if `id` is taken.
    pub fn register(&mut self, id: ContractId, factory: ContractFactory) -> Result<(), RegistryError> {
        if self.factories.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.factories.insert(id, factory);
        Ok(())
    }

    /// Returns `true` if a factory is registered under `id`.
    pub fn contains(&self, id: &ContractId) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered tags in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ContractId> {
        self.factories.keys()
    }

    /// Instantiates the contract registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnknownContract`] for an unregistered tag.
    pub fn instantiate(&self, id: &ContractId) -> Result<Box<dyn Contract>, ContractError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| ContractError::UnknownContract(id.clone()))?;
        Ok(factory())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Inert;

    impl Contract for Inert {
        fn contract_id(&self) -> ContractId {
            ContractId::new("inert")
        }

        fn spawn(
            &self,
            _snapshot: &dyn ReadOnlyStateTrie,
            _inst: &Instruction,
            coins: Vec<Coin>,
        ) -> Result<ContractOutput, ContractError> {
            Ok((Vec::new(), coins))
        }

        fn invoke(
            &self,
            _snapshot: &dyn ReadOnlyStateTrie,
            _inst: &Instruction,
            coins: Vec<Coin>,
        ) -> Result<ContractOutput, ContractError> {
            Ok((Vec::new(), coins))
        }

        fn delete(
            &self,
            _snapshot: &dyn ReadOnlyStateTrie,
            _inst: &Instruction,
            coins: Vec<Coin>,
        ) -> Result<ContractOutput, ContractError> {
            Ok((Vec::new(), coins))
        }
    }

    fn inert() -> Box<dyn Contract> {
        Box::new(Inert)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ContractRegistry::new();
        registry.register(ContractId::new("inert"), inert).unwrap();
        let err = registry.register(ContractId::new("inert"), inert).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate(ContractId::new("inert")));
    }

    #[test]
    fn unknown_tag_does_not_instantiate() {
        let registry = ContractRegistry::new();
        let err = registry.instantiate(&ContractId::new("ghost")).err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::UnknownContract);
    }

    #[test]
    fn registered_tag_instantiates() {
        let mut registry = ContractRegistry::new();
        registry.register(ContractId::new("inert"), inert).unwrap();
        let contract = registry.instantiate(&ContractId::new("inert")).unwrap();
        assert_eq!(contract.contract_id().as_str(), "inert");
    }
}
