// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hash helpers for tests.

use medchain_core::Hash;

/// Generate a generic test hash from a label (`blake3("test:" + label)`).
///
/// Useful as a context hash for verification calls, which the doubles in
/// this crate never interpret.
///
/// ```
/// use medchain_dry_tests::make_test_hash;
///
/// assert_eq!(make_test_hash("ctx"), make_test_hash("ctx"));
/// assert_ne!(make_test_hash("a"), make_test_hash("b"));
/// ```
pub fn make_test_hash(label: &str) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"test:");
    hasher.update(label.as_bytes());
    hasher.finalize().into()
}
