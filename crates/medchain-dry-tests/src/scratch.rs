// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Throwaway contract for executor tests.
//!
//! `scratch` stores the raw `v` argument and understands two commands:
//! `set` overwrites the value, `burst` emits a valid update followed by an
//! update of an address that does not exist, so the batch fails at commit.

use medchain_core::{
    Coin, Contract, ContractError, ContractId, ContractOutput, DarcId, Instruction, ReadOnlyStateTrie,
    StateAction, StateChange,
};

/// Contract tag of [`ScratchContract`].
pub const SCRATCH_CONTRACT_ID: &str = "scratch";

/// Minimal contract with no record encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScratchContract;

impl ScratchContract {
    /// Factory for [`medchain_core::ContractRegistry::register`].
    pub fn boxed() -> Box<dyn Contract> {
        Box::new(Self)
    }
}

fn change(action: StateAction, inst: &Instruction, value: Vec<u8>, darc: DarcId) -> StateChange {
    StateChange::new(
        action,
        inst.instance_id,
        ContractId::new(SCRATCH_CONTRACT_ID),
        value,
        darc,
    )
}

impl Contract for ScratchContract {
    fn contract_id(&self) -> ContractId {
        ContractId::new(SCRATCH_CONTRACT_ID)
    }

    fn spawn(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let darc = snapshot.get_darc_id(&inst.instance_id)?;
        let sc = StateChange::new(
            StateAction::Create,
            inst.derive_id(""),
            ContractId::new(SCRATCH_CONTRACT_ID),
            inst.args().search("v").to_vec(),
            darc,
        );
        Ok((vec![sc], coins))
    }

    fn invoke(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let entry = snapshot.get_values(&inst.instance_id)?;
        let value = inst.args().search("v").to_vec();
        match inst.command().unwrap_or_default() {
            "set" => Ok((
                vec![change(StateAction::Update, inst, value, entry.darc_id)],
                coins,
            )),
            "burst" => {
                let first = change(StateAction::Update, inst, value.clone(), entry.darc_id);
                let mut ghost = change(StateAction::Update, inst, value, entry.darc_id);
                ghost.instance_id = inst.derive_id("ghost");
                Ok((vec![first, ghost], coins))
            }
            other => Err(ContractError::UnsupportedCommand {
                contract: ContractId::new(SCRATCH_CONTRACT_ID),
                command: other.to_owned(),
            }),
        }
    }

    fn delete(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let darc = snapshot.get_darc_id(&inst.instance_id)?;
        Ok((vec![change(StateAction::Remove, inst, Vec::new(), darc)], coins))
    }
}
