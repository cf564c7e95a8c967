#![cfg(test)]

// Property tests for normalization and the CleverMap write/read paths.

use crate::clever_map::CleverMap;
use crate::error::CleverError;
use crate::key::Key;
use crate::normalize::Normalizer;
use crate::save::Save;
use proptest::prelude::*;

#[derive(Clone, Default)]
struct Log(Vec<(Key, i32)>);

impl Save<i32> for Log {
    fn save(&mut self, key: &Key, value: &i32) {
        self.0.push((key.clone(), *value));
    }
}

fn arb_any_key() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::None),
        any::<bool>().prop_map(Key::Bool),
        any::<i64>().prop_map(Key::Int),
        (-50i32..50).prop_map(|i| Key::Float(f64::from(i))),
        any::<f64>().prop_map(Key::Float),
        "[a-c0-9 ?_.-]{0,5}".prop_map(Key::Str),
        any::<String>().prop_map(Key::Str),
    ]
}

// Small pool full of spellings that collide after normalization.
fn pool() -> Vec<Key> {
    let mut keys: Vec<Key> = [
        "a", "a b", "a?b", "a_b", "_1", "1", "-1", "else", "_else", "True", "_True", "", " ", "_",
    ]
    .iter()
    .map(|s| Key::from(*s))
    .collect();
    keys.extend((-2..3).map(Key::Int));
    keys.extend([1.0, 2.0, -1.0, 0.5].map(Key::Float));
    keys.extend([Key::Bool(true), Key::Bool(false), Key::None]);
    keys
}

#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Get(usize),
    Del(usize),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let n = pool().len();
    let op = prop_oneof![
        4 => (0..n, any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        2 => (0..n).prop_map(Op::Get),
        1 => (0..n).prop_map(Op::Del),
    ];
    proptest::collection::vec(op, 1..40)
}

fn check_alias_table(x: &CleverMap<i32, Log>) -> Result<(), TestCaseError> {
    for (name, target) in x.aliases() {
        prop_assert!(x.normalizer().is_identifier(name), "alias {:?} is not an identifier", name);
        prop_assert!(
            x.keys().all(|k| k.as_str() != Some(name)),
            "alias {:?} shadows a real key",
            name
        );
        prop_assert!(x.keys().any(|k| k == target), "alias {:?} dangles", name);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    // Property: output is a legal, non-reserved identifier and a fixed point.
    #[test]
    fn prop_normalize_idempotent_and_legal(key in arb_any_key()) {
        let n = Normalizer::new();
        let once = n.normalize(&key);
        prop_assert!(n.is_identifier(&once), "{:?} -> {:?}", key, once);
        let twice = n.normalize(&Key::Str(once.clone()));
        prop_assert_eq!(twice, once);
    }

    // Property: a written string key reads back under itself and under its
    // generated alias.
    #[test]
    fn prop_alias_round_trip(name in "[a-z ?!.-]{1,8}", v in any::<i32>()) {
        let mut x = CleverMap::new();
        x.set_item(name.as_str(), v).unwrap();
        prop_assert_eq!(x.get_item(name.as_str()), Ok(&v));
        let norm = x.normalizer().normalize(&Key::from(name.as_str()));
        prop_assert_eq!(x.get_attr(&norm), Ok(&v));
        if norm != name {
            prop_assert_eq!(x.aliases().count(), 1);
        }
    }
}

// Property: random writes, reads and deletes over colliding spellings.
// - A successful write reads back, fires the hook once with the real key.
// - When the key's normalized form is a registered alias it reads back too.
// - A rejected write changes nothing and fires nothing.
// - Aliases stay identifiers, never shadow real keys, never dangle.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_write_read_delete(ops in arb_ops()) {
        let keys = pool();
        let mut x = CleverMap::with_saver(Log::default());
        for op in ops {
            match op {
                Op::Set(i, v) => {
                    let key = keys[i].clone();
                    let before = x.clone();
                    let fired = x.saver().0.len();
                    match x.set_item(key.clone(), v) {
                        Ok(()) => {
                            prop_assert_eq!(x.get_item(key.clone()), Ok(&v));
                            prop_assert_eq!(x.saver().0.len(), fired + 1);
                            let (hooked, hv) = x.saver().0.last().cloned().unwrap();
                            prop_assert_eq!(hv, v);
                            let real = x.resolve(key.clone()).cloned().unwrap();
                            prop_assert!(hooked.same_spelling(&real), "hook saw {:?}, real key {:?}", hooked, real);
                            // Equal keys can normalize apart (-1 and -1.0), so the
                            // alias may belong to another entry.
                            let norm = x.normalizer().normalize(&key);
                            if x.aliases().any(|(name, target)| name == norm && target == &real) {
                                prop_assert_eq!(x.get_item(norm.as_str()), Ok(&v));
                            }
                        }
                        Err(CleverError::DuplicateAlias(_)) => {
                            prop_assert!(x == before);
                            prop_assert_eq!(x.saver().0.len(), fired);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                    }
                }
                Op::Get(i) => {
                    let key = keys[i].clone();
                    match x.get_item(key.clone()) {
                        Ok(_) => prop_assert!(x.contains_key(key)),
                        Err(e) => {
                            prop_assert!(e.is_key_error());
                            prop_assert!(x.resolve(key).is_none());
                        }
                    }
                }
                Op::Del(i) => {
                    let key = keys[i].clone();
                    let len = x.len();
                    let found = x.contains_key(key.clone());
                    match x.del_item(key) {
                        Ok(_) => {
                            prop_assert!(found);
                            prop_assert_eq!(x.len(), len - 1);
                        }
                        Err(_) => {
                            prop_assert!(!found);
                            prop_assert_eq!(x.len(), len);
                        }
                    }
                }
            }
            check_alias_table(&x)?;
        }
    }
}
