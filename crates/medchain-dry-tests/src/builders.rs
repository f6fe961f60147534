// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Argument and instruction shorthands.
//!
//! Values are given as `&str` and stored as their UTF-8 bytes, which is how
//! every contract in the workspace reads them.

use medchain_core::{Argument, Arguments, InstanceId, Instruction};

/// Builds an ordered argument list from `(name, value)` pairs.
pub fn args(pairs: &[(&str, &str)]) -> Arguments {
    pairs.iter().map(|(k, v)| Argument::new(*k, *v)).collect()
}

/// Spawn of `contract` from the spawning instance `from`.
pub fn spawn(from: InstanceId, contract: &str, pairs: &[(&str, &str)]) -> Instruction {
    Instruction::spawn(from, contract, args(pairs))
}

/// Invoke of `command` on `target`, expecting `contract` to live there.
pub fn invoke(
    target: InstanceId,
    contract: &str,
    command: &str,
    pairs: &[(&str, &str)],
) -> Instruction {
    Instruction::invoke(target, contract, command, args(pairs))
}

/// Delete of `target`, expecting `contract` to live there.
pub fn delete(target: InstanceId, contract: &str) -> Instruction {
    Instruction::delete(target, contract)
}
