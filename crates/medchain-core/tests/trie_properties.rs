// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
use proptest::prelude::*;

use medchain_core::{
    make_darc_id, make_instance_id, ContractId, MemoryStateTrie, StateAction, StateChange,
    StateEntry,
};

fn entry(value: &[u8]) -> StateEntry {
    StateEntry {
        value: value.to_vec(),
        version: 0,
        contract_id: ContractId::new("test"),
        darc_id: make_darc_id("owner"),
    }
}

fn action_strategy() -> impl Strategy<Value = StateAction> {
    prop_oneof![
        Just(StateAction::Create),
        Just(StateAction::Update),
        Just(StateAction::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Seeding order must not leak into the root.
    #[test]
    fn state_root_ignores_insertion_order(
        labels in prop::collection::btree_set("[a-z]{1,4}", 0..12),
        seed in any::<u64>(),
    ) {
        let labels: Vec<String> = labels.into_iter().collect();
        let mut forward = MemoryStateTrie::new();
        for label in &labels {
            forward.seed(make_instance_id(label), entry(label.as_bytes()));
        }

        let mut shuffled = labels.clone();
        let len = shuffled.len();
        if len > 1 {
            let mut state = seed;
            for i in (1..len).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                let j = usize::try_from(state % (i as u64 + 1)).unwrap();
                shuffled.swap(i, j);
            }
        }
        let mut reverse = MemoryStateTrie::new();
        for label in &shuffled {
            reverse.seed(make_instance_id(label), entry(label.as_bytes()));
        }

        prop_assert_eq!(forward.state_root(), reverse.state_root());
    }

    // A batch either applies completely or not at all.
    #[test]
    fn batches_are_all_or_nothing(
        seeded in prop::collection::btree_set("[a-d]", 0..4),
        batch in prop::collection::vec((action_strategy(), "[a-d]", "[xyz]{0,2}"), 1..6),
    ) {
        let mut trie = MemoryStateTrie::new();
        for label in &seeded {
            trie.seed(make_instance_id(label), entry(b"seed"));
        }
        let before = trie.clone();

        let changes: Vec<StateChange> = batch
            .iter()
            .map(|(action, label, value)| {
                StateChange::new(
                    *action,
                    make_instance_id(label),
                    ContractId::new("test"),
                    value.as_bytes().to_vec(),
                    make_darc_id("owner"),
                )
            })
            .collect();

        // Replay the batch against a plain set of live keys to predict the outcome.
        let mut live: std::collections::BTreeSet<String> = seeded.clone();
        let expected_ok = batch.iter().all(|(action, label, _)| match action {
            StateAction::Create => live.insert(label.clone()),
            StateAction::Update => live.contains(label),
            StateAction::Remove => live.remove(label),
        });

        let result = trie.apply(&changes);
        prop_assert_eq!(result.is_ok(), expected_ok);
        if result.is_err() {
            prop_assert_eq!(&trie, &before);
        } else {
            prop_assert_eq!(trie.len(), live.len());
        }
    }
}
