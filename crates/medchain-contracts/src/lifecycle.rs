// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State-change construction shared by both contracts.

use medchain_core::{
    encode_record, Coin, ContractError, ContractId, ContractOutput, DarcId, Instruction,
    ReadOnlyStateTrie, StateAction, StateChange,
};
use serde::Serialize;

/// Creates the instance derived from `inst` holding `value`.
///
/// The ownership reference is read from the spawning instance
/// (`inst.instance_id`), which the engine guarantees is populated.
pub(crate) fn create_instance(
    contract_id: &str,
    snapshot: &dyn ReadOnlyStateTrie,
    inst: &Instruction,
    value: Vec<u8>,
    coins: Vec<Coin>,
) -> Result<ContractOutput, ContractError> {
    let darc_id = snapshot.get_darc_id(&inst.instance_id)?;
    let sc = StateChange::new(
        StateAction::Create,
        inst.derive_id(""),
        ContractId::new(contract_id),
        value,
        darc_id,
    );
    Ok((vec![sc], coins))
}

/// Re-encodes `record` as the new value of the target instance.
pub(crate) fn update_instance<T: Serialize>(
    contract_id: &str,
    inst: &Instruction,
    darc_id: DarcId,
    record: &T,
    coins: Vec<Coin>,
) -> Result<ContractOutput, ContractError> {
    let buf = encode_record(record).map_err(ContractError::encode)?;
    let sc = StateChange::new(
        StateAction::Update,
        inst.instance_id,
        ContractId::new(contract_id),
        buf,
        darc_id,
    );
    Ok((vec![sc], coins))
}

/// Removes the target instance without looking at its value.
pub(crate) fn remove_instance(
    contract_id: &str,
    snapshot: &dyn ReadOnlyStateTrie,
    inst: &Instruction,
    coins: Vec<Coin>,
) -> Result<ContractOutput, ContractError> {
    let darc_id = snapshot.get_darc_id(&inst.instance_id)?;
    let sc = StateChange::new(
        StateAction::Remove,
        inst.instance_id,
        ContractId::new(contract_id),
        Vec::new(),
        darc_id,
    );
    Ok((vec![sc], coins))
}
