// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted ownership verifiers.
//!
//! None of these evaluate an ownership document. They let tests pin down
//! which [`VerificationOptions`] reach the verifier and what happens when it
//! says no.

use std::sync::{Arc, Mutex};

use medchain_core::{
    ContractError, Hash, InstanceId, Instruction, InstructionVerifier, ReadOnlyStateTrie,
    VerificationOptions,
};

/// Verifier that authorizes everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl InstructionVerifier for AllowAll {
    fn verify(
        &self,
        _snapshot: &dyn ReadOnlyStateTrie,
        _inst: &Instruction,
        _ctx_hash: &Hash,
        _options: VerificationOptions,
    ) -> Result<(), ContractError> {
        Ok(())
    }
}

/// Verifier that rejects everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl InstructionVerifier for DenyAll {
    fn verify(
        &self,
        _snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        _ctx_hash: &Hash,
        _options: VerificationOptions,
    ) -> Result<(), ContractError> {
        Err(ContractError::Verification(format!(
            "denied: {}",
            inst.instance_id
        )))
    }
}

/// One call seen by a [`RecordingVerifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyCall {
    /// Target of the verified instruction.
    pub instance_id: InstanceId,
    /// Context hash passed in.
    pub ctx_hash: Hash,
    /// Options passed in.
    pub options: VerificationOptions,
}

/// Verifier that authorizes everything and records each call.
///
/// Clones share the same log, so a test can keep one handle and give the
/// other to an executor.
///
/// ```
/// use medchain_core::{make_instance_id, Instruction, InstructionVerifier, MemoryStateTrie, VerificationOptions};
/// use medchain_dry_tests::{make_test_hash, RecordingVerifier};
///
/// let verifier = RecordingVerifier::new();
/// let probe = verifier.clone();
/// let inst = Instruction::delete(make_instance_id("x"), "queryContract");
/// verifier
///     .verify(&MemoryStateTrie::new(), &inst, &make_test_hash("ctx"), VerificationOptions::default())
///     .unwrap();
/// assert_eq!(probe.calls().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingVerifier {
    calls: Arc<Mutex<Vec<VerifyCall>>>,
}

impl RecordingVerifier {
    /// Create a verifier with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<VerifyCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Options of the most recent call.
    pub fn last_options(&self) -> Option<VerificationOptions> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .map(|call| call.options)
    }
}

impl InstructionVerifier for RecordingVerifier {
    fn verify(
        &self,
        _snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        ctx_hash: &Hash,
        options: VerificationOptions,
    ) -> Result<(), ContractError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(VerifyCall {
                instance_id: inst.instance_id,
                ctx_hash: *ctx_hash,
                options,
            });
        Ok(())
    }
}

/// Verifier that only checks replay counters.
///
/// Every signer counter must equal `expected` unless the caller asked for
/// counters to be ignored. Models a deferred instruction whose counters went
/// stale while it waited for signatures.
#[derive(Debug, Clone, Copy)]
pub struct CounterCheckVerifier {
    expected: u64,
}

impl CounterCheckVerifier {
    /// Accept only counters equal to `expected`.
    pub fn expecting(expected: u64) -> Self {
        Self { expected }
    }
}

impl InstructionVerifier for CounterCheckVerifier {
    fn verify(
        &self,
        _snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        _ctx_hash: &Hash,
        options: VerificationOptions,
    ) -> Result<(), ContractError> {
        if options.ignore_counters {
            return Ok(());
        }
        match inst.signer_counters.iter().find(|c| **c != self.expected) {
            Some(stale) => Err(ContractError::Verification(format!(
                "stale counter {stale}, expected {}",
                self.expected
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hashes::make_test_hash;
    use medchain_core::{make_instance_id, ErrorKind, MemoryStateTrie};

    fn probe() -> Instruction {
        Instruction::delete(make_instance_id("x"), "queryContract")
    }

    #[test]
    fn deny_all_reports_verification_failure() {
        let err = DenyAll
            .verify(
                &MemoryStateTrie::new(),
                &probe(),
                &make_test_hash("ctx"),
                VerificationOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VerificationFailure);
    }

    #[test]
    fn recording_verifier_shares_log_between_clones() {
        let verifier = RecordingVerifier::new();
        let handle = verifier.clone();
        let opts = VerificationOptions {
            ignore_counters: true,
        };
        verifier
            .verify(&MemoryStateTrie::new(), &probe(), &make_test_hash("c"), opts)
            .unwrap();
        assert_eq!(handle.last_options(), Some(opts));
        assert_eq!(handle.calls()[0].ctx_hash, make_test_hash("c"));
        assert_eq!(verifier.calls().len(), 1);
    }

    #[test]
    fn counter_check_honours_ignore_flag() {
        let v = CounterCheckVerifier::expecting(1);
        let stale = probe().with_counters(vec![0]);
        let trie = MemoryStateTrie::new();
        let ctx = make_test_hash("ctx");

        assert!(v
            .verify(&trie, &stale, &ctx, VerificationOptions::default())
            .is_err());
        assert!(v
            .verify(
                &trie,
                &stale,
                &ctx,
                VerificationOptions {
                    ignore_counters: true
                }
            )
            .is_ok());
        assert!(v
            .verify(
                &trie,
                &probe().with_counters(vec![1, 1]),
                &ctx,
                VerificationOptions::default()
            )
            .is_ok());
    }
}
