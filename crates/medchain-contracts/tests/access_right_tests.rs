// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
use medchain_contracts::{default_registry, AccessRight, AccessRightContract, ACCESS_RIGHT_CONTRACT_ID};
use medchain_core::{
    decode_record, encode_record, make_darc_id, make_instance_id, Argument, Coin, Contract, ErrorKind,
    Executor, InstanceId, Instruction, MemoryStateTrie, ReadOnlyStateTrie, StateAction, VerificationOptions,
};
use medchain_dry_tests::{
    delete, genesis_trie, invoke, make_test_hash, spawn, AllowAll, CounterCheckVerifier,
    RecordingVerifier, TrieBuilder, GENESIS_DARC,
};

const AR: &str = ACCESS_RIGHT_CONTRACT_ID;

fn seeded(record: &AccessRight) -> (MemoryStateTrie, InstanceId) {
    let mut builder = TrieBuilder::new();
    let id = builder.instance("ar", AR, &encode_record(record).unwrap(), make_darc_id("owner"));
    (builder.build(), id)
}

fn stored(trie: &MemoryStateTrie, id: &InstanceId) -> AccessRight {
    decode_record(&trie.get_values(id).unwrap().value).unwrap()
}

#[test]
fn spawn_stores_raw_ar_argument() {
    let exec = Executor::new(default_registry().unwrap(), AllowAll);
    let (mut trie, genesis) = genesis_trie();
    let payload = encode_record(&AccessRight::from_pairs([("u1", "read")])).unwrap();
    let inst = Instruction::spawn(
        genesis,
        AR,
        [Argument::new("ar", payload.clone())].into_iter().collect(),
    );
    let receipt = exec.execute(&mut trie, &inst, Vec::new()).unwrap();

    let sc = &receipt.state_changes[0];
    assert_eq!(sc.action, StateAction::Create);
    assert_eq!(sc.instance_id, inst.derive_id(""));
    assert_eq!(sc.value, payload);
    assert_eq!(sc.darc_id, make_darc_id(GENESIS_DARC));
    assert_eq!(stored(&trie, &inst.derive_id("")), AccessRight::from_pairs([("u1", "read")]));
}

#[test]
fn spawn_without_ar_stores_empty_value_that_decodes_empty() {
    let exec = Executor::new(default_registry().unwrap(), AllowAll);
    let (mut trie, genesis) = genesis_trie();
    let inst = spawn(genesis, AR, &[]);
    exec.execute(&mut trie, &inst, Vec::new()).unwrap();

    let created = inst.derive_id("");
    assert!(trie.get_values(&created).unwrap().value.is_empty());
    assert!(stored(&trie, &created).is_empty());
}

#[test]
fn add_update_delete_lifecycle() {
    let exec = Executor::new(default_registry().unwrap(), AllowAll);
    let (mut trie, id) = seeded(&AccessRight::default());

    exec.execute(&mut trie, &invoke(id, AR, "add", &[("id", "u1"), ("ar", "read")]), Vec::new())
        .unwrap();
    exec.execute(&mut trie, &invoke(id, AR, "add", &[("id", "u2"), ("ar", "write")]), Vec::new())
        .unwrap();
    assert_eq!(
        stored(&trie, &id),
        AccessRight::from_pairs([("u1", "read"), ("u2", "write")])
    );

    exec.execute(&mut trie, &invoke(id, AR, "update", &[("id", "u2"), ("ar", "admin")]), Vec::new())
        .unwrap();
    exec.execute(&mut trie, &invoke(id, AR, "delete", &[("id", "u1")]), Vec::new())
        .unwrap();
    assert_eq!(stored(&trie, &id), AccessRight::from_pairs([("u2", "admin")]));

    let entry = trie.get_values(&id).unwrap();
    assert_eq!(entry.version, 4);
    assert_eq!(entry.darc_id, make_darc_id("owner"));
}

#[test]
fn deleting_the_only_grant_leaves_empty_lists() {
    let exec = Executor::new(default_registry().unwrap(), AllowAll);
    let (mut trie, id) = seeded(&AccessRight::from_pairs([("u1", "read")]));
    let receipt = exec
        .execute(&mut trie, &invoke(id, AR, "delete", &[("id", "u1")]), Vec::new())
        .unwrap();
    assert_eq!(receipt.state_changes.len(), 1);
    assert_eq!(receipt.state_changes[0].action, StateAction::Update);
    let emitted: AccessRight = decode_record(&receipt.state_changes[0].value).unwrap();
    assert!(emitted.is_empty());

    let record = stored(&trie, &id);
    assert!(record.is_empty());
    assert_eq!(record.ids().count(), 0);
    assert_eq!(record.access().count(), 0);
}

#[test]
fn rejected_invokes_leave_state_unchanged() {
    let exec = Executor::new(default_registry().unwrap(), AllowAll);
    let (mut trie, id) = seeded(&AccessRight::from_pairs([("u1", "read")]));
    let before = trie.clone();

    let cases = [
        (invoke(id, AR, "add", &[("id", "u1"), ("ar", "write")]), ErrorKind::DuplicateId),
        (invoke(id, AR, "update", &[("id", "u9"), ("ar", "x")]), ErrorKind::NotFound),
        (invoke(id, AR, "delete", &[("id", "u9")]), ErrorKind::NotFound),
        (invoke(id, AR, "grant", &[]), ErrorKind::UnsupportedCommand),
    ];
    for (inst, kind) in cases {
        let err = exec.execute(&mut trie, &inst, Vec::new()).unwrap_err();
        assert_eq!(err.kind(), kind, "{err}");
        assert_eq!(trie, before);
    }
}

#[test]
fn malformed_blob_rejects_invoke_but_not_delete() {
    let exec = Executor::new(default_registry().unwrap(), AllowAll);
    let mut builder = TrieBuilder::new();
    let id = builder.instance("broken", AR, &[0xff, 0x13, 0x37], make_darc_id("owner"));
    let mut trie = builder.build();

    let err = exec
        .execute(&mut trie, &invoke(id, AR, "add", &[("id", "u1"), ("ar", "r")]), Vec::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeFailure);

    let receipt = exec.execute(&mut trie, &delete(id, AR), Vec::new()).unwrap();
    let sc = &receipt.state_changes[0];
    assert_eq!(sc.action, StateAction::Remove);
    assert!(sc.value.is_empty());
    assert_eq!(sc.darc_id, make_darc_id("owner"));
    assert!(!trie.contains(&id));
}

#[test]
fn delete_of_missing_instance_is_upstream_lookup_failure() {
    let contract = AccessRightContract;
    let trie = MemoryStateTrie::new();
    let err = contract
        .delete(&trie, &delete(make_instance_id("gone"), AR), Vec::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamLookupFailure);
}

#[test]
fn deferred_verification_ignores_counters() {
    let recorder = RecordingVerifier::new();
    let exec = Executor::new(default_registry().unwrap(), recorder.clone());
    let (trie, id) = seeded(&AccessRight::default());
    let inst = invoke(id, AR, "add", &[("id", "u1"), ("ar", "r")]).with_counters(vec![3]);
    let ctx = make_test_hash("deferred");

    exec.verify_deferred(&trie, &inst, &ctx).unwrap();
    let call = recorder.calls()[0];
    assert_eq!(call.ctx_hash, ctx);
    assert_eq!(
        call.options,
        VerificationOptions {
            ignore_counters: true
        }
    );

    // A stale counter would fail a normal execution but passes deferred checks.
    let strict = Executor::new(default_registry().unwrap(), CounterCheckVerifier::expecting(9));
    exec_err_is_verification(&strict, &trie, &inst);
    strict.verify_deferred(&trie, &inst, &ctx).unwrap();
}

fn exec_err_is_verification(
    exec: &Executor<CounterCheckVerifier>,
    trie: &MemoryStateTrie,
    inst: &Instruction,
) {
    let mut scratch = trie.clone();
    let err = exec.execute(&mut scratch, inst, Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationFailure);
}

#[test]
fn every_lifecycle_call_returns_coins_untouched() {
    let coins = vec![
        Coin {
            name: make_test_hash("fee"),
            value: 42,
        },
        Coin {
            name: make_test_hash("gas"),
            value: 0,
        },
    ];
    let (trie, id) = seeded(&AccessRight::from_pairs([("u1", "read")]));
    let contract = AccessRightContract;

    let (_, back) = contract
        .spawn(&trie, &spawn(id, AR, &[]), coins.clone())
        .unwrap();
    assert_eq!(back, coins);

    let add = invoke(id, AR, "add", &[("id", "u2"), ("ar", "write")]);
    let (_, back) = contract.invoke(&trie, &add, coins.clone()).unwrap();
    assert_eq!(back, coins);

    let (_, back) = contract.delete(&trie, &delete(id, AR), coins.clone()).unwrap();
    assert_eq!(back, coins);
}
