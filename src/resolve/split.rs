//! Flattening of nested qualifier mappings.
//!
//! A nested mapping such as `inter: { eff: 0.8, start: 25 }` becomes the two top-level entries
//! `inter.eff` and `inter.start`. Lists of scalars are left alone; they turn into sweep
//! sequences during expression resolution.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::core::RawValue;

/// Separator between the outer and the inner name of a flattened entry.
pub const SEPARATOR: char = '.';

/// Flatten all nested mappings into top-level entries.
///
/// Entries given explicitly at the top level take precedence over flattened entries of the
/// same name. Empty mappings produce no entries.
pub fn split_lists(entries: BTreeMap<String, RawValue>) -> BTreeMap<String, RawValue> {
    let (nested, mut flat): (BTreeMap<_, _>, BTreeMap<_, _>) =
        entries.into_iter().partition(|(_, value)| value.is_nested());

    for (name, value) in nested {
        flatten_into(&name, value, &mut flat);
    }
    flat
}

fn flatten_into(prefix: &str, value: RawValue, flat: &mut BTreeMap<String, RawValue>) {
    match value {
        RawValue::Nested(entries) => {
            for (name, value) in entries {
                flatten_into(&format!("{prefix}{SEPARATOR}{name}"), value, flat);
            }
        }
        leaf => match flat.entry(prefix.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(leaf);
            }
            Entry::Occupied(_) => {
                log::warn!("Ignoring nested value for `{prefix}`, it is already set.");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(entries: &[(&str, RawValue)]) -> RawValue {
        RawValue::Nested(
            entries
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }

    #[test]
    fn flatten_nested() {
        let mut entries = BTreeMap::new();
        entries.insert("trans.rate".to_string(), RawValue::from(0.3));
        entries.insert(
            "inter".to_string(),
            nested(&[
                ("eff", RawValue::from(0.8)),
                ("start", RawValue::from(25.0)),
                ("by.group", nested(&[("g2", RawValue::from(0.5))])),
            ]),
        );

        let flat = split_lists(entries);
        assert_eq!(flat.len(), 4);
        assert_eq!(flat["trans.rate"], RawValue::from(0.3));
        assert_eq!(flat["inter.eff"], RawValue::from(0.8));
        assert_eq!(flat["inter.start"], RawValue::from(25.0));
        assert_eq!(flat["inter.by.group.g2"], RawValue::from(0.5));
        assert!(flat.values().all(|value| !value.is_nested()));
    }

    #[test]
    fn empty_nested_mapping() {
        let mut entries = BTreeMap::new();
        entries.insert("trans.rate".to_string(), RawValue::from(0.3));
        entries.insert("inter".to_string(), nested(&[]));

        let flat = split_lists(entries);
        assert_eq!(flat.len(), 1);
        assert!(!flat.contains_key("inter"));
    }

    #[test]
    fn lists_and_expressions_pass_through() {
        let sweep = RawValue::List(vec![RawValue::from(0.1), RawValue::expr("base * 2")]);
        let mut entries = BTreeMap::new();
        entries.insert("trans.rate".to_string(), sweep.clone());
        entries.insert("rec.rate".to_string(), RawValue::expr("1 / 7"));

        let flat = split_lists(entries);
        assert_eq!(flat["trans.rate"], sweep);
        assert_eq!(flat["rec.rate"], RawValue::expr("1 / 7"));
    }

    #[test]
    fn top_level_wins() {
        let mut entries = BTreeMap::new();
        entries.insert("inter.eff".to_string(), RawValue::from(0.9));
        entries.insert("inter".to_string(), nested(&[("eff", RawValue::from(0.8))]));

        let flat = split_lists(entries);
        assert_eq!(flat["inter.eff"], RawValue::from(0.9));
    }
}
