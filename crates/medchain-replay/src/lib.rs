// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! medchain replay harness.
//!
//! Loads a JSON scenario (genesis instances plus an ordered instruction
//! list), runs it through the executor with both contracts registered, and
//! records or checks the state root after every step. Two runs of the same
//! scenario must produce the same root chain byte for byte.

pub mod config;
pub mod config_fs;
pub mod replay;
pub mod scenario;
