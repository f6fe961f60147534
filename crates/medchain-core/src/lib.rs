// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! medchain-core: the call boundary between a replicated ledger's execution
//! engine and its contracts.
//!
//! Contracts are deterministic state-mutation modules. The engine hands them a
//! read-only snapshot and an [`Instruction`]; they hand back a batch of
//! [`StateChange`]s, which the engine commits atomically. Authorization is
//! never evaluated here: it is delegated to an injected
//! [`InstructionVerifier`].
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
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

pub mod codec;
mod contract;
mod error;
mod executor;
mod ident;
mod instruction;
mod state_change;
mod trie;

// Re-exports for stable public API
/// Record encoding helpers.
pub use codec::{decode_record, encode_record, CodecError};
/// Contract dispatch surface, ownership verification seam and registry.
pub use contract::{
    Contract, ContractFactory, ContractOutput, ContractRegistry, InstructionVerifier,
    RegistryError, VerificationOptions,
};
/// Error taxonomy.
pub use error::{ContractError, ErrorKind};
/// Engine-side executor.
pub use executor::{BlockReport, Disposition, Executor, Receipt};
/// Identifier types and constructors.
pub use ident::{
    make_darc_id, make_instance_id, ContractId, DarcId, Hash, IdParseError, InstanceId,
};
/// Instructions and arguments.
pub use instruction::{Action, Argument, Arguments, Instruction};
/// State-change records and the resource bucket.
pub use state_change::{Coin, StateAction, StateChange};
/// Snapshot accessor and in-memory store.
pub use trie::{MemoryStateTrie, ReadOnlyStateTrie, StateEntry, TrieError};
