// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instructions and their named arguments.
//!
//! An [`Instruction`] targets one instance and carries exactly one lifecycle
//! action (spawn, invoke, delete). Instructions are content-addressed: the
//! [`Instruction::hash`] digest is what every replica derives new instance
//! addresses from, so its byte layout is part of the consensus surface.

use blake3::Hasher;

use crate::ident::{ContractId, Hash, InstanceId};

/// One named argument of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Argument name.
    pub name: String,
    /// Raw argument value.
    pub value: Vec<u8>,
}

impl Argument {
    /// Builds an argument from a name and any byte-like value.
    pub fn new(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered argument list of an instruction.
///
/// Order is significant: contracts that fold over arguments (for example the
/// query contract's spawn) observe them in instruction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(pub Vec<Argument>);

impl Arguments {
    /// Returns the value of the first argument called `name`.
    ///
    /// Absence is not an error: a missing name yields an empty slice, and any
    /// required-field validation is left to the contract.
    #[must_use]
    pub fn search(&self, name: &str) -> &[u8] {
        self.0
            .iter()
            .find(|arg| arg.name == name)
            .map_or(&[], |arg| arg.value.as_slice())
    }

    /// Iterates arguments in instruction order.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.0.iter()
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Argument> for Arguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lifecycle action carried by an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a new instance of `contract_id`.
    Spawn {
        /// Contract type to instantiate.
        contract_id: ContractId,
        /// Spawn arguments.
        args: Arguments,
    },
    /// Run `command` against an existing instance.
    Invoke {
        /// Contract type the caller expects at the target instance.
        contract_id: ContractId,
        /// Command name, parsed by the contract.
        command: String,
        /// Command arguments.
        args: Arguments,
    },
    /// Remove an existing instance.
    Delete {
        /// Contract type the caller expects at the target instance.
        contract_id: ContractId,
    },
}

impl Action {
    const fn code(&self) -> u8 {
        match self {
            Self::Spawn { .. } => 1,
            Self::Invoke { .. } => 2,
            Self::Delete { .. } => 3,
        }
    }

    /// Contract type named by the action.
    #[must_use]
    pub fn contract_id(&self) -> &ContractId {
        match self {
            Self::Spawn { contract_id, .. }
            | Self::Invoke { contract_id, .. }
            | Self::Delete { contract_id } => contract_id,
        }
    }

    /// Arguments of the action (empty for delete).
    #[must_use]
    pub fn args(&self) -> &Arguments {
        static EMPTY: Arguments = Arguments(Vec::new());
        match self {
            Self::Spawn { args, .. } | Self::Invoke { args, .. } => args,
            Self::Delete { .. } => &EMPTY,
        }
    }

    /// Short label used in logs and reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Invoke { .. } => "invoke",
            Self::Delete { .. } => "delete",
        }
    }
}

/// A single instruction addressed to one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Target instance. For spawns this is the *spawning* instance whose
    /// ownership reference the new instance inherits.
    pub instance_id: InstanceId,
    /// Lifecycle action.
    pub action: Action,
    /// Per-signer replay-protection counters, checked by the ownership
    /// verifier unless explicitly ignored.
    pub signer_counters: Vec<u64>,
}

impl Instruction {
    /// Builds a spawn instruction.
    pub fn spawn(instance_id: InstanceId, contract_id: impl Into<ContractId>, args: Arguments) -> Self {
        Self {
            instance_id,
            action: Action::Spawn {
                contract_id: contract_id.into(),
                args,
            },
            signer_counters: Vec::new(),
        }
    }

    /// Builds an invoke instruction.
    pub fn invoke(
        instance_id: InstanceId,
        contract_id: impl Into<ContractId>,
        command: impl Into<String>,
        args: Arguments,
    ) -> Self {
        Self {
            instance_id,
            action: Action::Invoke {
                contract_id: contract_id.into(),
                command: command.into(),
                args,
            },
            signer_counters: Vec::new(),
        }
    }

    /// Builds a delete instruction.
    pub fn delete(instance_id: InstanceId, contract_id: impl Into<ContractId>) -> Self {
        Self {
            instance_id,
            action: Action::Delete {
                contract_id: contract_id.into(),
            },
            signer_counters: Vec::new(),
        }
    }

    /// Command name for invokes, `None` otherwise.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match &self.action {
            Action::Invoke { command, .. } => Some(command),
            Action::Spawn { .. } | Action::Delete { .. } => None,
        }
    }

    /// Arguments of the carried action.
    #[must_use]
    pub fn args(&self) -> &Arguments {
        self.action.args()
    }

    /// Replaces the signer counters.
    pub fn with_counters(mut self, counters: Vec<u64>) -> Self {
        self.signer_counters = counters;
        self
    }

    /// Canonical digest of the instruction.
    ///
    /// Layout (BLAKE3, domain `b"instr:"`): instance id, action code, contract
    /// tag, command (invoke only), argument count and length-prefixed
    /// name/value pairs, counter count and LE counters.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let mut h = Hasher::new();
        h.update(b"instr:");
        h.update(self.instance_id.as_bytes());
        h.update(&[self.action.code()]);
        update_len_prefixed(&mut h, self.action.contract_id().as_str().as_bytes());
        if let Action::Invoke { command, .. } = &self.action {
            update_len_prefixed(&mut h, command.as_bytes());
        }
        let args = self.action.args();
        h.update(&(args.len() as u64).to_le_bytes());
        for arg in args {
            update_len_prefixed(&mut h, arg.name.as_bytes());
            update_len_prefixed(&mut h, &arg.value);
        }
        h.update(&(self.signer_counters.len() as u64).to_le_bytes());
        for counter in &self.signer_counters {
            h.update(&counter.to_le_bytes());
        }
        h.finalize().into()
    }

    /// Derives a fresh instance address from this instruction.
    ///
    /// Every replica computes the same address for the same instruction, and
    /// distinct `what` labels yield distinct addresses.
    #[must_use]
    pub fn derive_id(&self, what: &str) -> InstanceId {
        let mut h = Hasher::new();
        h.update(b"derive:");
        h.update(&self.hash());
        h.update(&(what.len() as u32).to_le_bytes());
        h.update(what.as_bytes());
        InstanceId(h.finalize().into())
    }
}

fn update_len_prefixed(h: &mut Hasher, bytes: &[u8]) {
    h.update(&(bytes.len() as u64).to_le_bytes());
    h.update(bytes);
}
