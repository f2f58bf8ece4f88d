use notetree::match_path;

use crate::integration::support::{modules, schema};

#[test]
fn namespace_absorbs_unknown_children() {
    let modules = modules(vec![schema("bond", "bond", true)]);
    let found = match_path("bond.ch1", &modules).unwrap();
    assert_eq!(found.module_id, "bond");
    assert_eq!(found.schema.id(), "bond");
    assert!(found.namespace);

    let deep = match_path("bond.ch1.gch1.ggch1", &modules).unwrap();
    assert_eq!(deep.schema.id(), "bond");
    assert!(deep.namespace);
}

#[test]
fn exact_child_wins_over_namespace() {
    let modules = modules(vec![
        schema("bond", "bond", true),
        schema("bond-ch1", "bond.ch1", false),
    ]);
    let found = match_path("bond.ch1", &modules).unwrap();
    assert_eq!(found.schema.id(), "bond-ch1");
    assert!(!found.namespace);

    assert!(match_path("bond.ch1.x", &modules).is_none());
    assert_eq!(match_path("bond.ch2", &modules).unwrap().schema.id(), "bond");
}

#[test]
fn unknown_domain_has_no_match() {
    let modules = modules(vec![schema("bond", "bond", true)]);
    assert!(match_path("foo.ch1", &modules).is_none());
    assert!(match_path("", &modules).is_none());
}

#[test]
fn domain_alone_matches_module_root() {
    let modules = modules(vec![schema("bond", "bond", false)]);
    let found = match_path("bond", &modules).unwrap();
    assert_eq!(found.schema.id(), "bond");
    assert!(!found.namespace);
}
