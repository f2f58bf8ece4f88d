use notetree::types::{NodeKind, RawNodeRecord};
use notetree::build_tree;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn names_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    let segment = prop::sample::select(vec!["a", "b", "c", "d"]);
    let name = prop::collection::vec(segment, 1..4).prop_map(|segments| segments.join("."));
    prop::collection::btree_set(name, 1..12)
}

fn records(names: &BTreeSet<String>) -> Vec<RawNodeRecord> {
    names
        .iter()
        .map(|name| RawNodeRecord::note(format!("id-{name}"), name.as_str()))
        .collect()
}

proptest! {
    #[test]
    fn every_prefix_has_a_node(names in names_strategy()) {
        let tree = build_tree(NodeKind::Note, records(&names)).unwrap();
        prop_assert!(tree.validate().is_ok());
        for name in &names {
            let segments: Vec<&str> = name.split('.').collect();
            for end in 1..=segments.len() {
                let prefix = segments[..end].join(".");
                let node = tree.get_by_name(&prefix);
                prop_assert!(node.is_some(), "missing prefix {}", prefix);
                let node = node.unwrap();
                prop_assert_eq!(node.is_stub, !names.contains(&prefix));
            }
        }
    }

    #[test]
    fn input_order_does_not_matter(
        (names, shuffled) in names_strategy()
            .prop_flat_map(|names| (Just(names.clone()), Just(records(&names)).prop_shuffle()))
    ) {
        let ordered = build_tree(NodeKind::Note, records(&names)).unwrap();
        let reordered = build_tree(NodeKind::Note, shuffled).unwrap();
        prop_assert_eq!(ordered, reordered);
    }
}

#[test]
fn stub_ids_are_stable_across_builds() {
    let first = build_tree(NodeKind::Note, vec![RawNodeRecord::note("c", "a.b.c")]).unwrap();
    let second = build_tree(NodeKind::Note, vec![RawNodeRecord::note("c", "a.b.c")]).unwrap();
    assert_eq!(
        first.get_by_name("a.b").unwrap().id,
        second.get_by_name("a.b").unwrap().id
    );
}
