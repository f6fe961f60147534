// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scenario format.
//!
//! A scenario is a genesis state plus an ordered instruction list. Instance
//! references are written as 64-char hex, `label:<text>`, or `@<n>` for the
//! address created by the spawn at step `n`. Darc references accept hex and
//! `label:<text>`.

use std::fs;
use std::path::Path;

use medchain_core::{
    make_darc_id, make_instance_id, Action, Argument, Arguments, ContractId, DarcId, IdParseError,
    InstanceId, Instruction, MemoryStateTrie, StateEntry,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or resolving a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read.
    #[error("reading scenario: {0}")]
    Io(#[from] std::io::Error),
    /// Scenario file is not valid JSON for this format.
    #[error("parsing scenario: {0}")]
    Json(#[from] serde_json::Error),
    /// An id reference is neither a label nor valid hex.
    #[error("bad id reference {reference:?}: {source}")]
    Id {
        /// Reference as written.
        reference: String,
        /// Parse failure.
        source: IdParseError,
    },
    /// A hex-encoded value is malformed.
    #[error("bad hex in {field}: {source}")]
    Hex {
        /// Field holding the value.
        field: String,
        /// Decode failure.
        source: hex::FromHexError,
    },
    /// An `@<n>` reference does not name an earlier spawn.
    #[error("step {step}: {reference:?} does not name an earlier spawn")]
    SpawnRef {
        /// Step holding the reference.
        step: usize,
        /// Reference as written.
        reference: String,
    },
}

/// One pre-seeded instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisEntry {
    /// Instance reference (hex or `label:`).
    pub instance_id: String,
    /// Contract tag stored on the instance.
    pub contract_id: String,
    /// Ownership reference (hex or `label:`).
    pub darc_id: String,
    /// Hex-encoded stored value.
    #[serde(default)]
    pub value: String,
}

/// One instruction argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioArg {
    /// Argument name.
    pub name: String,
    /// UTF-8 value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Hex value, used when `value` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_hex: Option<String>,
}

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Spawn from an existing instance.
    Spawn {
        /// Spawning instance.
        instance_id: String,
        /// Contract to instantiate.
        contract_id: String,
        /// Spawn arguments.
        #[serde(default)]
        args: Vec<ScenarioArg>,
        /// Signer counters.
        #[serde(default)]
        counters: Vec<u64>,
    },
    /// Invoke a command.
    Invoke {
        /// Target instance.
        instance_id: String,
        /// Expected contract tag.
        contract_id: String,
        /// Command name.
        command: String,
        /// Command arguments.
        #[serde(default)]
        args: Vec<ScenarioArg>,
        /// Signer counters.
        #[serde(default)]
        counters: Vec<u64>,
    },
    /// Delete an instance.
    Delete {
        /// Target instance.
        instance_id: String,
        /// Expected contract tag.
        contract_id: String,
        /// Signer counters.
        #[serde(default)]
        counters: Vec<u64>,
    },
}

/// A complete scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Instances present before the first step.
    #[serde(default)]
    pub genesis: Vec<GenesisEntry>,
    /// Steps in execution order.
    #[serde(default)]
    pub instructions: Vec<ScenarioStep>,
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a scenario file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Trie holding the genesis instances.
    pub fn genesis_trie(&self) -> Result<MemoryStateTrie, ScenarioError> {
        let mut trie = MemoryStateTrie::new();
        for entry in &self.genesis {
            let id = labelled_or_hex(&entry.instance_id, make_instance_id)?;
            let value = hex::decode(&entry.value).map_err(|source| ScenarioError::Hex {
                field: format!("genesis {}", entry.instance_id),
                source,
            })?;
            trie.seed(
                id,
                StateEntry {
                    value,
                    version: 0,
                    contract_id: ContractId::new(entry.contract_id.as_str()),
                    darc_id: darc_ref(&entry.darc_id)?,
                },
            );
        }
        Ok(trie)
    }

    /// Resolved instruction list.
    pub fn instructions(&self) -> Result<Vec<Instruction>, ScenarioError> {
        let mut built: Vec<Instruction> = Vec::with_capacity(self.instructions.len());
        for (step, def) in self.instructions.iter().enumerate() {
            let inst = match def {
                ScenarioStep::Spawn {
                    instance_id,
                    contract_id,
                    args,
                    counters,
                } => Instruction::spawn(
                    instance_ref(instance_id, &built, step)?,
                    contract_id.as_str(),
                    arguments(args, step)?,
                )
                .with_counters(counters.clone()),
                ScenarioStep::Invoke {
                    instance_id,
                    contract_id,
                    command,
                    args,
                    counters,
                } => Instruction::invoke(
                    instance_ref(instance_id, &built, step)?,
                    contract_id.as_str(),
                    command.as_str(),
                    arguments(args, step)?,
                )
                .with_counters(counters.clone()),
                ScenarioStep::Delete {
                    instance_id,
                    contract_id,
                    counters,
                } => Instruction::delete(
                    instance_ref(instance_id, &built, step)?,
                    contract_id.as_str(),
                )
                .with_counters(counters.clone()),
            };
            built.push(inst);
        }
        Ok(built)
    }
}

fn labelled_or_hex<T>(reference: &str, from_label: fn(&str) -> T) -> Result<T, ScenarioError>
where
    T: std::str::FromStr<Err = IdParseError>,
{
    match reference.strip_prefix("label:") {
        Some(label) => Ok(from_label(label)),
        None => reference.parse().map_err(|source| ScenarioError::Id {
            reference: reference.to_owned(),
            source,
        }),
    }
}

fn darc_ref(reference: &str) -> Result<DarcId, ScenarioError> {
    labelled_or_hex(reference, make_darc_id)
}

fn instance_ref(
    reference: &str,
    built: &[Instruction],
    step: usize,
) -> Result<InstanceId, ScenarioError> {
    let Some(index) = reference.strip_prefix('@') else {
        return labelled_or_hex(reference, make_instance_id);
    };
    let spawn_ref = || ScenarioError::SpawnRef {
        step,
        reference: reference.to_owned(),
    };
    let index: usize = index.parse().map_err(|_| spawn_ref())?;
    match built.get(index) {
        Some(inst) if matches!(inst.action, Action::Spawn { .. }) => Ok(inst.derive_id("")),
        _ => Err(spawn_ref()),
    }
}

fn arguments(defs: &[ScenarioArg], step: usize) -> Result<Arguments, ScenarioError> {
    defs
        .iter()
        .map(|def| {
            let value = match (&def.value, &def.value_hex) {
                (Some(text), _) => text.as_bytes().to_vec(),
                (None, Some(hex_value)) => {
                    hex::decode(hex_value).map_err(|source| ScenarioError::Hex {
                        field: format!("step {step} argument {}", def.name),
                        source,
                    })?
                }
                (None, None) => Vec::new(),
            };
            Ok(Argument::new(def.name.as_str(), value))
        })
        .collect()
}
