//! Property-based tests for type casing, version ordering and expansion
//!
//! These tests verify the engine's pure rules across a wide range of inputs.

use omi_schemas::jsonld::expand;
use omi_schemas::validation::is_valid_type_casing;
use omi_schemas::versioning::{select_latest_branch, SchemaVersion, VersionRegistry, LATEST};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Strategy for version labels such as `v3`, `v1.2`, `v10.0.1`
fn version_label_strategy() -> impl Strategy<Value = (u32, Option<u32>, Option<u32>)> {
    (0u32..50, proptest::option::of(0u32..20), proptest::option::of(0u32..20))
}

fn label((major, minor, patch): (u32, Option<u32>, Option<u32>)) -> String {
    match (minor, patch) {
        (Some(minor), Some(patch)) => format!("v{}.{}.{}", major, minor, patch),
        (Some(minor), None) => format!("v{}.{}", major, minor),
        _ => format!("v{}", major),
    }
}

proptest! {
    /// Property: casing is flagged iff the trailing segment starts lowercase
    #[test]
    fn prop_type_casing_follows_first_char(
        prefix in "(https://openminds\\.om-i\\.org/types/|core:|)",
        name in "[a-zA-Z][a-zA-Z0-9]{0,20}",
    ) {
        let type_name = format!("{}{}", prefix, name);
        let first_upper = name.chars().next().unwrap().is_uppercase();
        prop_assert_eq!(is_valid_type_casing(&type_name), first_upper);
    }

    /// Property: ordered versions are numerically descending with latest last
    #[test]
    fn prop_ordered_versions_descending(
        labels in proptest::collection::hash_set(version_label_strategy().prop_map(label), 1..8),
    ) {
        let mut manifest = Map::new();
        for label in &labels {
            manifest.insert(label.clone(), json!({}));
        }
        manifest.insert(LATEST.to_string(), json!({}));
        let registry = VersionRegistry::from_slice(Value::Object(manifest).to_string().as_bytes()).unwrap();

        let ordered = registry.ordered_versions();
        prop_assert_eq!(ordered.last().map(String::as_str), Some(LATEST));
        let numeric: Vec<SchemaVersion> = ordered[..ordered.len() - 1]
            .iter()
            .map(|l| SchemaVersion::parse(l).unwrap())
            .collect();
        prop_assert!(numeric.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Property: the selected latest branch is the numeric maximum
    #[test]
    fn prop_latest_branch_is_numeric_max(
        versions in proptest::collection::vec(version_label_strategy(), 1..10),
        noise in proptest::collection::vec("(main|dev|pipeline|feature-[a-z]{1,5})", 0..4),
    ) {
        let mut branches: Vec<String> = versions.iter().cloned().map(label).collect();
        branches.extend(noise);

        let selected = select_latest_branch(&branches).unwrap();
        let selected = SchemaVersion::from_branch_name(&selected).unwrap();
        let max = versions
            .iter()
            .map(|(major, minor, patch)| SchemaVersion::new(*major, minor.unwrap_or(0), patch.unwrap_or(0)))
            .max()
            .unwrap();
        prop_assert_eq!(selected, max);
    }

    /// Property: expanding an already expanded document double-prefixes keys
    #[test]
    fn prop_expand_is_not_idempotent(
        keys in proptest::collection::hash_set("[a-z][a-zA-Z]{0,15}", 1..6),
    ) {
        let vocab = "https://openminds.om-i.org/props/";
        let mut doc = Map::new();
        doc.insert("@context".to_string(), json!({"@vocab": vocab}));
        for key in &keys {
            doc.insert(key.clone(), json!("value"));
        }
        let context = json!({"@vocab": vocab});

        let once = expand(&doc, None);
        let twice = expand(&once, context.as_object());
        for key in &keys {
            let expanded = format!("{}{}", vocab, key);
            prop_assert!(once.contains_key(&expanded));
            let doubled = format!("{}{}", vocab, expanded);
            prop_assert!(twice.contains_key(&doubled));
        }
    }
}

#[test]
fn test_latest_branch_example() {
    assert_eq!(select_latest_branch(&["v1", "v2", "v10", "main"]).as_deref(), Some("v10"));
}
