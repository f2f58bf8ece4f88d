use notetree::types::{NodeKind, RawNodeRecord};
use notetree::{build_tree, BuildError};

#[test]
fn stubs_fill_every_missing_prefix() {
    let tree = build_tree(
        NodeKind::Note,
        vec![
            RawNodeRecord::note("c", "a.b.c"),
            RawNodeRecord::note("x", "a.x"),
        ],
    )
    .unwrap();

    let a = tree.get_by_name("a").unwrap();
    let ab = tree.get_by_name("a.b").unwrap();
    assert!(a.is_stub);
    assert!(ab.is_stub);
    assert_eq!(ab.parent_id.as_deref(), Some(a.id.as_str()));
    assert_eq!(tree.get("c").unwrap().parent_id.as_deref(), Some(ab.id.as_str()));
    assert_eq!(a.child_ids, vec![ab.id.clone(), "x".to_string()]);
    assert_eq!(tree.root().unwrap().child_ids, vec![a.id.clone()]);
    assert!(!tree.root().unwrap().is_stub);
    tree.validate().unwrap();
}

#[test]
fn later_record_promotes_stub_and_repoints_children() {
    let mut tree = build_tree(NodeKind::Note, vec![RawNodeRecord::note("c", "a.b.c")]).unwrap();
    let stub_id = tree.get_by_name("a.b").unwrap().id.clone();

    tree.insert(RawNodeRecord::note("b", "a.b")).unwrap();

    assert!(tree.get(&stub_id).is_none());
    let b = tree.get("b").unwrap();
    assert!(!b.is_stub);
    assert_eq!(b.child_ids, vec!["c".to_string()]);
    assert_eq!(tree.get("c").unwrap().parent_id.as_deref(), Some("b"));
    let a = tree.get_by_name("a").unwrap();
    assert_eq!(a.child_ids, vec!["b".to_string()]);
    tree.validate().unwrap();
}

#[test]
fn same_path_twice_is_a_conflict() {
    let err = build_tree(
        NodeKind::Note,
        vec![
            RawNodeRecord::note("one", "foo.bar"),
            RawNodeRecord::note("two", "foo.bar"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::DuplicatePath { .. }));
}

#[test]
fn root_record_keeps_its_id() {
    let tree = build_tree(
        NodeKind::Note,
        vec![
            RawNodeRecord::note("foo", "foo"),
            RawNodeRecord::note("home", "root"),
        ],
    )
    .unwrap();
    assert_eq!(tree.root_id(), "home");
    assert_eq!(tree.get("foo").unwrap().parent_id.as_deref(), Some("home"));
    assert_eq!(tree.len(), 2);
}

#[test]
fn removing_a_parent_leaves_a_stub() {
    let mut tree = build_tree(
        NodeKind::Note,
        vec![
            RawNodeRecord::note("foo", "foo"),
            RawNodeRecord::note("ch1", "foo.ch1"),
        ],
    )
    .unwrap();
    let removed = tree.remove("foo").unwrap();
    assert_eq!(removed.id, "foo");

    let stub = tree.get_by_name("foo").unwrap();
    assert!(stub.is_stub);
    assert_eq!(tree.get("ch1").unwrap().parent_id.as_deref(), Some(stub.id.as_str()));
    tree.validate().unwrap();

    tree.remove("ch1").unwrap();
    assert!(tree.get_by_name("foo").is_none());
    assert_eq!(tree.len(), 1);
}
