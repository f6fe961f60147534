// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for medchain crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`verifiers`] - Scripted ownership verifiers (allow, deny, record, counter check)
//! - [`builders`] - Argument and instruction shorthands
//! - [`fixtures`] - Seeded tries with a genesis ownership instance
//! - [`scratch`] - Throwaway contract for executor tests
//! - [`hashes`] - Deterministic labels to hashes

pub mod builders;
pub mod fixtures;
pub mod hashes;
pub mod scratch;
pub mod verifiers;

pub use builders::{args, delete, invoke, spawn};
pub use fixtures::{genesis_trie, TrieBuilder, GENESIS_DARC};
pub use hashes::make_test_hash;
pub use scratch::{ScratchContract, SCRATCH_CONTRACT_ID};
pub use verifiers::{AllowAll, CounterCheckVerifier, DenyAll, RecordingVerifier, VerifyCall};
