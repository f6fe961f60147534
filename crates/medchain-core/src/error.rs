// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for contract calls.
//!
//! Every failure aborts the whole call: a contract returns either a complete
//! batch of state changes or an error, never a partial batch.

use thiserror::Error;

use crate::codec::CodecError;
use crate::ident::{ContractId, InstanceId};
use crate::trie::TrieError;

/// Failure of a contract call or of its surrounding dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The stored blob could not be decoded into the contract's record.
    #[error("decoding stored value: {0}")]
    Decode(CodecError),
    /// The mutated record could not be encoded.
    #[error("encoding record: {0}")]
    Encode(CodecError),
    /// `add` named an id that is already registered.
    #[error("id already registered: {0}")]
    DuplicateId(String),
    /// `update`/`delete` named an id that is not registered.
    #[error("no such id: {0}")]
    NotFound(String),
    /// The invoke command is not one the contract understands.
    #[error("contract {contract} does not support command {command:?}")]
    UnsupportedCommand {
        /// Contract that rejected the command.
        contract: ContractId,
        /// Command as received.
        command: String,
    },
    /// The snapshot accessor failed; propagated verbatim.
    #[error(transparent)]
    Lookup(#[from] TrieError),
    /// The ownership subsystem rejected the instruction.
    #[error("verification failed: {0}")]
    Verification(String),
    /// No contract is registered for the tag.
    #[error("unknown contract: {0}")]
    UnknownContract(ContractId),
    /// The instruction names a different contract than the one stored at the target.
    #[error("instance {instance} holds {stored}, instruction names {requested}")]
    ContractMismatch {
        /// Target instance.
        instance: InstanceId,
        /// Tag stored at the instance.
        stored: ContractId,
        /// Tag named by the instruction.
        requested: ContractId,
    },
    /// The engine could not commit the returned batch.
    #[error("commit failed: {0}")]
    Commit(TrieError),
}

impl ContractError {
    /// Wraps a codec failure raised while reading a stored blob.
    pub fn decode(err: CodecError) -> Self {
        Self::Decode(err)
    }

    /// Wraps a codec failure raised while writing a record.
    pub fn encode(err: CodecError) -> Self {
        Self::Encode(err)
    }

    /// Taxonomy tag used when reporting the rejection.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::DecodeFailure,
            Self::Encode(_) => ErrorKind::EncodeFailure,
            Self::DuplicateId(_) => ErrorKind::DuplicateId,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedCommand { .. } => ErrorKind::UnsupportedCommand,
            Self::Lookup(_) => ErrorKind::UpstreamLookupFailure,
            Self::Verification(_) => ErrorKind::VerificationFailure,
            Self::UnknownContract(_) => ErrorKind::UnknownContract,
            Self::ContractMismatch { .. } => ErrorKind::ContractMismatch,
            Self::Commit(_) => ErrorKind::CommitFailure,
        }
    }
}

/// Rejection kind surfaced to the instruction's originator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// Malformed stored blob.
    DecodeFailure,
    /// Record could not be encoded (internal).
    EncodeFailure,
    /// `add` on an existing id.
    DuplicateId,
    /// `update`/`delete` on a missing id.
    NotFound,
    /// Unknown invoke command.
    UnsupportedCommand,
    /// Snapshot accessor failure.
    UpstreamLookupFailure,
    /// Ownership verification failure.
    VerificationFailure,
    /// No contract registered for the tag.
    UnknownContract,
    /// Instruction and instance disagree on the contract tag.
    ContractMismatch,
    /// Batch could not be committed.
    CommitFailure,
}

impl ErrorKind {
    /// Stable name used in reports and golden files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DecodeFailure => "DecodeFailure",
            Self::EncodeFailure => "EncodeFailure",
            Self::DuplicateId => "DuplicateID",
            Self::NotFound => "NotFound",
            Self::UnsupportedCommand => "UnsupportedCommand",
            Self::UpstreamLookupFailure => "UpstreamLookupFailure",
            Self::VerificationFailure => "VerificationFailure",
            Self::UnknownContract => "UnknownContract",
            Self::ContractMismatch => "ContractMismatch",
            Self::CommitFailure => "CommitFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
