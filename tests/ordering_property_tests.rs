//! Property test: with contributor sorting enabled, the rendered artifact is
//! byte-identical no matter what order contributions arrive in.

use genweave::{Aggregator, MaterializeOptions, TypeDeclaration};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

#[path = "./support/mod.rs"]
mod support;
use support::RecordingStore;

/// Contributor names are unique (map keys) and every value is derived from
/// its contributor, so no run trips the duplicate-enumerator validation.
fn entries_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::btree_map("[A-Z][a-z]{1,6}", 1usize..4, 1..6).prop_map(|map| {
        map.into_iter()
            .map(|(name, count)| {
                let values = (0..count).map(|i| format!("{name}_{i}")).collect();
                (name, values)
            })
            .collect()
    })
}

fn render_with_sort(entries: &[(String, Vec<String>)]) -> String {
    let aggregator = Aggregator::new();
    aggregator
        .register_declaration("Tags", "owner", TypeDeclaration::enumeration("Tag", "tags.h"))
        .unwrap();
    for (name, values) in entries {
        aggregator
            .submit_content("Tags", name, values.clone())
            .unwrap();
    }
    let mut store = RecordingStore::new();
    aggregator
        .materialize_all(
            &mut store,
            &MaterializeOptions {
                output_root: PathBuf::from("out"),
                sort_contributors: true,
                ..MaterializeOptions::default()
            },
        )
        .unwrap();
    store.text(Path::new("out/tags.h"))
}

proptest! {
    #[test]
    fn sorted_rendering_is_independent_of_ingestion_order(
        (entries, shuffled) in entries_strategy().prop_flat_map(|entries| {
            let shuffled = Just(entries.clone()).prop_shuffle();
            (Just(entries), shuffled)
        })
    ) {
        prop_assert_eq!(render_with_sort(&entries), render_with_sort(&shuffled));
    }
}
