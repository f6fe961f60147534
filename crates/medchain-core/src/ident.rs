// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier and hashing utilities.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Canonical 256-bit hash used for instance addresses, ownership references,
/// instruction digests and state roots.
pub type Hash = [u8; 32];

/// Address of one instance in the global state store.
///
/// `InstanceId` is opaque: genesis instances are usually label-derived via
/// [`make_instance_id`], while spawned instances are derived from the creating
/// instruction (see [`crate::Instruction::derive_id`]). Tooling must not assume
/// ids are reversible back into labels.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct InstanceId(pub Hash);

impl InstanceId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

/// Opaque reference to the ownership document (access-control policy) that
/// governs an instance.
///
/// Contracts forward this value into every state change they emit and never
/// look inside it; evaluation belongs to the ownership subsystem behind
/// [`crate::InstructionVerifier`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct DarcId(pub Hash);

impl DarcId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

/// Contract-type tag stored alongside every instance.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ContractId(String);

impl ContractId {
    /// Wraps a contract-type tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContractId {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing a hex-encoded identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    Hex(String),
    /// Input decoded to the wrong number of bytes.
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

fn parse_hash(s: &str) -> Result<Hash, IdParseError> {
    let raw = hex::decode(s).map_err(|e| IdParseError::Hex(e.to_string()))?;
    let len = raw.len();
    raw.try_into().map_err(|_| IdParseError::Length(len))
}

macro_rules! hex_id {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl FromStr for $ty {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hash(s).map(Self)
            }
        }
    };
}

hex_id!(InstanceId);
hex_id!(DarcId);

/// Produces a stable, domain-separated instance identifier (prefix `b"instance:"`) using BLAKE3.
pub fn make_instance_id(label: &str) -> InstanceId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"instance:");
    hasher.update(label.as_bytes());
    InstanceId(hasher.finalize().into())
}

/// Produces a stable, domain-separated ownership reference (prefix `b"darc:"`) using BLAKE3.
pub fn make_darc_id(label: &str) -> DarcId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"darc:");
    hasher.update(label.as_bytes());
    DarcId(hasher.finalize().into())
}
