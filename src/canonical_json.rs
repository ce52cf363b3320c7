//! Canonical JSON rendering for argument values.
//!
//! `serde_json`'s `Value::Object` is backed by a `BTreeMap` whenever the
//! `preserve_order` feature is disabled (the default, and the only
//! configuration this crate builds with), so `serde_json::to_string`
//! already renders object keys in sorted order with no inter-token
//! whitespace. That is exactly spec.md §3's "stable key order, no
//! whitespace" requirement — no bespoke serializer needed.

/// Render `value` as canonical JSON: recursively sorted object keys, no
/// whitespace. Panics only if `value` contains a non-finite float, which
/// `resolve_value` never produces (it maps those to `null` already).
pub fn to_canonical_string(value: &serde_json::Value) -> String {
    serde_json::to_string(value).expect("resolved argument values always serialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    // P8 (SPEC_FULL.md §8): canonical JSON rendering is deterministic and
    // independent of the order keys were inserted in.
    proptest! {
        #[test]
        fn canonical_string_is_independent_of_key_insertion_order(
            pairs in proptest::collection::vec(("[a-z]{1,6}", any::<i64>()), 0..8)
        ) {
            let mut seen = HashSet::new();
            let unique: Vec<(String, i64)> = pairs.into_iter().filter(|(k, _)| seen.insert(k.clone())).collect();

            let mut forward = serde_json::Map::new();
            for (k, v) in &unique {
                forward.insert(k.clone(), serde_json::Value::from(*v));
            }
            let mut backward = serde_json::Map::new();
            for (k, v) in unique.iter().rev() {
                backward.insert(k.clone(), serde_json::Value::from(*v));
            }

            prop_assert_eq!(
                to_canonical_string(&serde_json::Value::Object(forward)),
                to_canonical_string(&serde_json::Value::Object(backward))
            );
        }

        #[test]
        fn canonical_string_contains_no_whitespace(
            pairs in proptest::collection::vec(("[a-z]{1,6}", any::<i64>()), 0..8)
        ) {
            let mut seen = HashSet::new();
            let mut map = serde_json::Map::new();
            for (k, v) in pairs.into_iter().filter(|(k, _)| seen.insert(k.clone())) {
                map.insert(k, serde_json::Value::from(v));
            }

            let rendered = to_canonical_string(&serde_json::Value::Object(map));
            prop_assert!(!rendered.chars().any(char::is_whitespace));
        }
    }
}
