use std::collections::BTreeSet;

use prefix_trie::{Error, PrefixTree, MAX_KEY_LENGTH};
use quickcheck::{quickcheck, TestResult};

/// Squeezes arbitrary bytes into a four letter alphabet so that generated
/// keys actually share prefixes.
fn narrow(key: Vec<u8>) -> Vec<u8> {
    key.into_iter()
        .take(MAX_KEY_LENGTH - 1)
        .map(|b| b'a' + b % 4)
        .collect()
}

fn narrow_all(keys: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    keys.into_iter().map(narrow).collect()
}

fn as_set(keys: Vec<Vec<u8>>) -> BTreeSet<Vec<u8>> {
    keys.into_iter().collect()
}

fn strings(keys: &[&str]) -> BTreeSet<Vec<u8>> {
    keys.iter().map(|k| k.as_bytes().to_vec()).collect()
}

#[test]
fn test_foo_fo_bar_scenario() {
    let mut tree = PrefixTree::new();
    tree.add("foo").unwrap();
    tree.add("fo").unwrap();
    tree.add("bar").unwrap();

    assert_eq!(tree.size(), 3);
    assert_eq!(as_set(tree.keys()), strings(&["foo", "fo", "bar"]));
    assert_eq!(as_set(tree.completions("fo").unwrap()), strings(&["", "o"]));
    assert_eq!(as_set(tree.completions("ba").unwrap()), strings(&["r"]));

    assert_eq!(tree.remove("fo"), Ok(true));
    assert_eq!(tree.has("fo"), Ok(false));
    assert_eq!(tree.has("foo"), Ok(true));
    assert_eq!(tree.size(), 2);

    assert_eq!(tree.remove("xyz"), Ok(false));
}

#[test]
fn test_reset_scenario() {
    let mut tree: PrefixTree = ["alpha", "alphabet", "beta", ""].iter().collect();
    assert_eq!(tree.size(), 4);

    assert!(tree.reset());
    assert_eq!(tree.size(), 0);
    assert!(tree.keys().is_empty());
    for key in ["alpha", "alphabet", "beta", "", "anything"] {
        assert_eq!(tree.has(key), Ok(false));
    }
}

#[test]
fn test_repeated_remove_after_pruning() {
    let mut tree: PrefixTree = ["car", "cart", "carton"].iter().collect();

    assert_eq!(tree.remove("carton"), Ok(true));
    assert_eq!(tree.remove("carton"), Ok(false));
    assert!(!tree.view("carto").unwrap().exists());
    assert_eq!(as_set(tree.keys()), strings(&["car", "cart"]));

    assert_eq!(tree.remove("cart"), Ok(true));
    assert_eq!(tree.remove("car"), Ok(true));
    assert_eq!(tree, PrefixTree::new());
}

#[test]
fn test_error_message() {
    let mut tree = PrefixTree::new();
    let err = tree.add(vec![b'x'; 300]).unwrap_err();

    assert_eq!(err, Error::KeyTooLong { len: 300 });
    assert_eq!(err.to_string(), "key is too long (300 bytes, must be under 256)");
}

quickcheck! {
    fn prop_matches_set_model(ops: Vec<(bool, Vec<u8>)>, absent: Vec<Vec<u8>>) -> bool {
        let mut tree = PrefixTree::new();
        let mut model = BTreeSet::new();

        for (insert, key) in ops {
            let key = narrow(key);
            let (changed, expected) = if insert {
                (tree.add(&key), model.insert(key.clone()))
            } else {
                (tree.remove(&key), model.remove(&key))
            };
            if changed != Ok(expected) {
                return false;
            }
        }

        let keys = tree.keys();
        keys.len() == model.len()
            && tree.size() == model.len()
            && as_set(keys) == model
            && model.iter().all(|key| tree.has(key) == Ok(true))
            && narrow_all(absent)
                .iter()
                .filter(|key| !model.contains(*key))
                .all(|key| tree.has(key) == Ok(false))
    }

    fn prop_add_is_idempotent(keys: Vec<Vec<u8>>, key: Vec<u8>) -> bool {
        let mut tree: PrefixTree = narrow_all(keys).into_iter().collect();
        let key = narrow(key);

        tree.add(&key).unwrap();
        let once = tree.clone();
        tree.add(&key) == Ok(false) && tree == once
    }

    fn prop_add_then_remove_restores(keys: Vec<Vec<u8>>, key: Vec<u8>) -> TestResult {
        let mut tree: PrefixTree = narrow_all(keys).into_iter().collect();
        let key = narrow(key);
        if tree.has(&key) == Ok(true) {
            return TestResult::discard();
        }

        let before = tree.clone();
        let added = tree.add(&key);
        let removed = tree.remove(&key);

        TestResult::from_bool(
            added == Ok(true)
                && removed == Ok(true)
                && tree == before
                && tree.size() == before.size()
                && tree.has(&key) == Ok(false),
        )
    }

    fn prop_completions_are_exact(keys: Vec<Vec<u8>>, prefix: Vec<u8>) -> bool {
        let keys = narrow_all(keys);
        let tree: PrefixTree = keys.iter().collect();
        let prefix: Vec<u8> = narrow(prefix).into_iter().take(3).collect();

        let completions = tree.completions(&prefix).unwrap();
        let expected: BTreeSet<Vec<u8>> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(prefix.as_slice()))
            .map(|rest| rest.to_vec())
            .collect();

        let full: BTreeSet<Vec<u8>> = expected
            .iter()
            .map(|rest| [prefix.as_slice(), rest.as_slice()].concat())
            .collect();

        completions.len() == expected.len()
            && as_set(completions) == expected
            && as_set(tree.matches(&prefix).unwrap()) == full
            && tree.view(&prefix).unwrap().iter().collect::<BTreeSet<_>>() == full
    }

    fn prop_long_keys_rejected(keys: Vec<Vec<u8>>, extra: Vec<u8>) -> bool {
        let mut tree: PrefixTree = narrow_all(keys).into_iter().collect();
        let before = tree.clone();

        let mut long = vec![b'a'; MAX_KEY_LENGTH];
        long.extend(extra);
        let err = Error::KeyTooLong { len: long.len() };

        tree.add(&long) == Err(err.clone())
            && tree.remove(&long) == Err(err.clone())
            && tree.has(&long) == Err(err.clone())
            && tree.completions(&long) == Err(err)
            && tree == before
    }

    fn prop_removing_everything_prunes_all(keys: Vec<Vec<u8>>) -> bool {
        let keys = narrow_all(keys);
        let mut tree: PrefixTree = keys.iter().collect();

        for key in &keys {
            tree.remove(key).unwrap();
        }
        tree.is_empty() && tree == PrefixTree::new()
    }
}
