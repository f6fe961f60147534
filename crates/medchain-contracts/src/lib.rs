// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! medchain-contracts: the ledger's two record-keeping contracts.
//!
//! - [`AccessRightContract`] (`"accessright"`) keeps an ordered list of
//!   `(actor id, access right)` grants with `add` / `update` / `delete`.
//! - [`QueryContract`] (`"queryContract"`) keeps a key/value list of opaque
//!   query records with bulk spawn and upsert-or-delete `update`.
//!
//! Both are pure functions of `(stored value, instruction)` and forward the
//! instance's ownership reference unchanged into every state change.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod access_right;
mod lifecycle;
mod query;

use medchain_core::{ContractId, ContractRegistry, RegistryError};

pub use access_right::{
    AccessRight, AccessRightCommand, AccessRightContract, Grant, ACCESS_RIGHT_CONTRACT_ID,
};
pub use query::{Query, QueryCommand, QueryContract, QueryData, QUERY_CONTRACT_ID};

/// Registers both contracts under their tags.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if either tag is already taken.
pub fn register_all(registry: &mut ContractRegistry) -> Result<(), RegistryError> {
    registry.register(ContractId::new(ACCESS_RIGHT_CONTRACT_ID), AccessRightContract::boxed)?;
    registry.register(ContractId::new(QUERY_CONTRACT_ID), QueryContract::boxed)?;
    Ok(())
}

/// Builds a registry holding both contracts.
///
/// # Errors
///
/// Propagates [`register_all`]'s [`RegistryError::Duplicate`].
pub fn default_registry() -> Result<ContractRegistry, RegistryError> {
    let mut registry = ContractRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}
