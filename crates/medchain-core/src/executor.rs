// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine side of the contract call boundary.
//!
//! For every instruction the executor verifies ownership, resolves the
//! contract type, loads the stored blob, dispatches the lifecycle call and
//! commits the returned batch. A rejected instruction leaves the store
//! exactly as it was, so instructions are safe to retry.

use tracing::{debug, warn};

use crate::contract::{Contract, ContractRegistry, InstructionVerifier, VerificationOptions};
use crate::error::{ContractError, ErrorKind};
use crate::ident::Hash;
use crate::instruction::{Action, Instruction};
use crate::state_change::{Coin, StateChange};
use crate::trie::{MemoryStateTrie, ReadOnlyStateTrie};

/// Outcome of one committed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// State changes that were committed.
    pub state_changes: Vec<StateChange>,
    /// Resource bucket handed back by the contract.
    pub coins: Vec<Coin>,
}

/// Per-instruction disposition within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The instruction committed this many state changes.
    Applied(usize),
    /// The instruction was rejected; nothing was persisted.
    Rejected(ErrorKind),
}

/// Result of executing an ordered block of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReport {
    /// One entry per instruction, in block order.
    pub dispositions: Vec<Disposition>,
    /// State root after each instruction, in block order.
    pub roots: Vec<Hash>,
}

impl BlockReport {
    /// Number of rejected instructions.
    pub fn rejected(&self) -> usize {
        self.dispositions
            .iter()
            .filter(|d| matches!(d, Disposition::Rejected(_)))
            .count()
    }
}

/// Dispatches instructions to registered contracts.
pub struct Executor<V> {
    registry: ContractRegistry,
    verifier: V,
}

impl<V: InstructionVerifier> Executor<V> {
    /// Creates an executor over `registry`, authorizing through `verifier`.
    pub fn new(registry: ContractRegistry, verifier: V) -> Self {
        Self { registry, verifier }
    }

    /// Registered contracts.
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Ownership verifier in use.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Executes one instruction and commits its state changes.
    ///
    /// # Errors
    ///
    /// Any verification, dispatch or commit failure; `trie` is untouched.
    pub fn execute(
        &self,
        trie: &mut MemoryStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<Receipt, ContractError> {
        let ctx_hash = inst.hash();
        self.verifier
            .verify(&*trie, inst, &ctx_hash, VerificationOptions::default())?;

        let (state_changes, coins) = {
            let snapshot: &dyn ReadOnlyStateTrie = &*trie;
            let contract = self.resolve(snapshot, inst)?;
            match &inst.action {
                Action::Spawn { .. } => contract.spawn(snapshot, inst, coins)?,
                Action::Invoke { .. } => contract.invoke(snapshot, inst, coins)?,
                Action::Delete { .. } => contract.delete(snapshot, inst, coins)?,
            }
        };

        trie.apply(&state_changes).map_err(ContractError::Commit)?;
        debug!(
            action = inst.action.label(),
            contract = %inst.action.contract_id(),
            instance = %inst.instance_id,
            changes = state_changes.len(),
            "instruction applied"
        );
        Ok(Receipt {
            state_changes,
            coins,
        })
    }

    /// Executes `block` in order, one instruction at a time.
    ///
    /// Rejections are recorded and do not stop the block.
    pub fn execute_block(&self, trie: &mut MemoryStateTrie, block: &[Instruction]) -> BlockReport {
        let mut report = BlockReport::default();
        for (idx, inst) in block.iter().enumerate() {
            let disposition = match self.execute(trie, inst, Vec::new()) {
                Ok(receipt) => Disposition::Applied(receipt.state_changes.len()),
                Err(err) => {
                    warn!(
                        index = idx,
                        action = inst.action.label(),
                        instance = %inst.instance_id,
                        kind = %err.kind(),
                        %err,
                        "instruction rejected"
                    );
                    Disposition::Rejected(err.kind())
                }
            };
            report.dispositions.push(disposition);
            report.roots.push(trie.state_root());
        }
        report
    }

    /// Checks a deferred instruction through its target contract.
    ///
    /// # Errors
    ///
    /// Resolution failures, or whatever the contract's verification reports.
    pub fn verify_deferred(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        ctx_hash: &Hash,
    ) -> Result<(), ContractError> {
        let contract = self.resolve(snapshot, inst)?;
        contract.verify_deferred_instruction(snapshot, inst, ctx_hash, &self.verifier)
    }

    /// Resolves the contract that handles `inst`.
    ///
    /// Spawns use the tag the instruction names. Invokes and deletes use the
    /// tag stored at the target, which the instruction must agree with.
    fn resolve(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
    ) -> Result<Box<dyn Contract>, ContractError> {
        let requested = inst.action.contract_id();
        if !matches!(inst.action, Action::Spawn { .. }) {
            let entry = snapshot.get_values(&inst.instance_id)?;
            if &entry.contract_id != requested {
                return Err(ContractError::ContractMismatch {
                    instance: inst.instance_id,
                    stored: entry.contract_id,
                    requested: requested.clone(),
                });
            }
        }
        self.registry.instantiate(requested)
    }
}
