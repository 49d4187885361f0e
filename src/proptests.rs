use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::RadixSet;

/// Reference implementation using BTreeSet for comparison
#[derive(Default, Clone)]
struct Model {
    keys: BTreeSet<Vec<u8>>,
}

impl Model {
    fn insert(&mut self, key: Vec<u8>) -> bool {
        self.keys.insert(key)
    }

    fn remove(&mut self, key: &[u8]) -> bool {
        self.keys.remove(key)
    }

    fn remove_prefix(&mut self, prefix: &[u8]) -> usize {
        let before = self.keys.len();
        self.keys.retain(|key| !key.starts_with(prefix));
        before - self.keys.len()
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains(key)
    }

    fn prefix_len(&self, prefix: &[u8]) -> usize {
        self.keys.iter().filter(|key| key.starts_with(prefix)).count()
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Actions to test against both implementations
#[derive(Arbitrary, Debug, Clone)]
enum Action {
    Insert(Key),
    Remove(Key),
    RemovePrefix(Key),
    Contains(Key),
    PrefixLen(Key),
}

/// Wrapper for key generation with custom strategy
#[derive(Debug, Clone)]
struct Key(Vec<u8>);

impl Arbitrary for Key {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            // Empty key
            Just(Key(vec![])),
            // Short raw byte keys
            prop::collection::vec(any::<u8>(), 1..4).prop_map(Key),
            // Dense small alphabet to force splits and merges
            "[ab]{1,6}".prop_map(|s| Key(s.into_bytes())),
            // Keys with natural delimiters to exercise prefix compression
            "[a-e]{2,5}/[a-e]{1,4}".prop_map(|s| Key(s.into_bytes())),
            // Keys with shared prefixes
            "[a-e]{2,5}".prop_map(|prefix| {
                let mut key = prefix.into_bytes();
                key.extend_from_slice(b"/suffix");
                Key(key)
            }),
        ]
        .boxed()
    }
}

/// Test harness that executes actions on both RadixSet and Model
#[derive(Default)]
struct Test {
    set: RadixSet,
    model: Model,
}

impl Test {
    fn execute(&mut self, action: Action) {
        match action {
            Action::Insert(Key(key)) => {
                let set_result = self.set.insert(&key);
                let model_result = self.model.insert(key.clone());
                assert_eq!(
                    set_result, model_result,
                    "insert mismatch for key {key:?}"
                );
            }
            Action::Remove(Key(key)) => {
                assert_eq!(
                    self.set.remove(&key),
                    self.model.remove(&key),
                    "remove mismatch for key {key:?}"
                );
            }
            Action::RemovePrefix(Key(prefix)) => {
                assert_eq!(
                    self.set.remove_prefix(&prefix),
                    self.model.remove_prefix(&prefix),
                    "remove_prefix mismatch for prefix {prefix:?}"
                );
            }
            Action::Contains(Key(key)) => {
                assert_eq!(
                    self.set.contains(&key),
                    self.model.contains(&key),
                    "contains mismatch for key {key:?}"
                );
            }
            Action::PrefixLen(Key(prefix)) => {
                let expected = self.model.prefix_len(&prefix);
                assert_eq!(
                    self.set.prefix_len(&prefix),
                    expected,
                    "prefix_len mismatch for prefix {prefix:?}"
                );
                assert_eq!(
                    self.set.contains_prefix(&prefix),
                    expected > 0,
                    "contains_prefix mismatch for prefix {prefix:?}"
                );
            }
        }
        // The structural invariants and the cached length must survive every
        // action.
        assert!(self.set.check_invariants(), "invariants violated");
        assert_eq!(self.set.len(), self.model.len(), "length mismatch");
        assert_eq!(self.set.is_empty(), self.model.len() == 0);
    }

    fn verify_iteration(&self) {
        let expected: Vec<Vec<u8>> = self.model.keys.iter().cloned().collect();
        let forward: Vec<Vec<u8>> = self.set.iter().collect();
        assert_eq!(forward, expected, "forward iteration mismatch");

        let backward: Vec<Vec<u8>> = self.set.iter().rev().collect();
        let reversed: Vec<Vec<u8>> = expected.iter().rev().cloned().collect();
        assert_eq!(backward, reversed, "reverse iteration mismatch");

        assert!(forward.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(self.set.first(), expected.first().cloned());
        assert_eq!(self.set.last(), expected.last().cloned());
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn proptest_vs_btreeset(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        let mut test = Test::default();
        for action in actions {
            test.execute(action);
        }
        test.verify_iteration();
    }

    #[test]
    fn proptest_prefix_ranges(
        keys in prop::collection::vec(any::<Key>(), 0..48),
        prefixes in prop::collection::vec(any::<Key>(), 1..16),
    ) {
        let mut test = Test::default();
        for Key(key) in keys {
            test.set.insert(&key);
            test.model.insert(key);
        }
        for Key(prefix) in prefixes {
            let expected: Vec<Vec<u8>> = test
                .model
                .keys
                .iter()
                .filter(|key| key.starts_with(&prefix))
                .cloned()
                .collect();
            let forward: Vec<Vec<u8>> = test.set.prefix_iter(&prefix).collect();
            assert_eq!(forward, expected, "prefix range mismatch for {prefix:?}");

            let backward: Vec<Vec<u8>> = test.set.prefix_iter(&prefix).rev().collect();
            let reversed: Vec<Vec<u8>> = expected.iter().rev().cloned().collect();
            assert_eq!(backward, reversed, "reverse prefix range mismatch for {prefix:?}");

            assert_eq!(test.set.prefix_len(&prefix), expected.len());
            assert_eq!(
                test.set.find_prefix(&prefix).key(),
                expected.first().cloned(),
                "find_prefix mismatch for {prefix:?}"
            );
        }
    }

    #[test]
    fn proptest_clone_round_trip(keys in prop::collection::vec(any::<Key>(), 0..48)) {
        let set: RadixSet = keys.iter().map(|Key(key)| key).collect();
        let copy = set.clone();
        assert!(copy.check_invariants());
        assert_eq!(set, copy);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            copy.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn proptest_set_algebra(
        left in prop::collection::vec(any::<Key>(), 0..32),
        right in prop::collection::vec(any::<Key>(), 0..32),
    ) {
        let a: RadixSet = left.iter().map(|Key(key)| key).collect();
        let b: RadixSet = right.iter().map(|Key(key)| key).collect();

        let union = &a + &b;
        let difference = &a - &b;
        assert!(union.check_invariants());
        assert!(difference.check_invariants());

        let mut model_union: BTreeSet<Vec<u8>> = left.iter().map(|Key(key)| key.clone()).collect();
        model_union.extend(right.iter().map(|Key(key)| key.clone()));
        assert_eq!(union.len(), model_union.len());
        assert_eq!(union.iter().collect::<Vec<_>>(), model_union.into_iter().collect::<Vec<_>>());

        for Key(key) in &right {
            assert!(union.contains(key));
            assert!(!difference.contains(key));
        }

        assert!(a.is_subset(&union));
        assert!(b.is_subset(&union));
        assert!(difference.is_subset(&a));
        if difference.len() < a.len() {
            assert!(difference < a);
        }
    }
}
