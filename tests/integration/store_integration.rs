use std::fs;
use std::path::PathBuf;

use notetree::store::{DeleteOptions, FileStore, NodeStore, WriteOptions};
use notetree::types::NodeKind;
use notetree::StorageError;
use tempfile::TempDir;

use crate::integration::support::write_note;

fn vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_note(dir.path(), "root", "root", "home\n");
    write_note(dir.path(), "foo", "foo", "");
    write_note(dir.path(), "foo.ch1", "ch1", "one\n");
    write_note(dir.path(), "foo.ch2", "ch2", "two\n");
    write_note(dir.path(), "bar.baz", "baz", "");
    dir
}

#[tokio::test]
async fn query_all_builds_tree_and_fills_cache() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    let tree = store.query_all(NodeKind::Note).await.unwrap();

    assert_eq!(tree.len(), 6);
    assert!(tree.get_by_name("bar").unwrap().is_stub);
    assert_eq!(tree.get("foo").unwrap().child_ids, vec!["ch1", "ch2"]);
    assert_eq!(store.cached_path("ch2"), Some(PathBuf::from("foo.ch2.md")));
    let bar_stub = tree.get_by_name("bar").unwrap();
    assert_eq!(store.cached_path(&bar_stub.id), Some(PathBuf::from("bar.md")));
    assert_eq!(store.cache_len(), 6);
}

#[tokio::test]
async fn malformed_headers_fail_the_whole_query() {
    let dir = vault();
    fs::write(dir.path().join("bad1.md"), "---\nid: [oops\n---\n").unwrap();
    fs::write(dir.path().join("bad2.md"), "---\nid: x\n").unwrap();
    let store = FileStore::new(dir.path());

    let err = store.query_all(NodeKind::Note).await.unwrap_err();
    match err {
        StorageError::BadParse { paths } => {
            assert_eq!(
                paths,
                vec![dir.path().join("bad1.md"), dir.path().join("bad2.md")]
            );
        }
        other => panic!("expected BadParse, got {other:?}"),
    }
    assert_eq!(store.cache_len(), 0);
}

#[tokio::test]
async fn missing_header_is_tolerated() {
    let dir = vault();
    fs::write(dir.path().join("plain.md"), "no front matter here\n").unwrap();
    let store = FileStore::new(dir.path());

    let tree = store.query_all(NodeKind::Note).await.unwrap();
    let plain = tree.get("plain").unwrap();
    assert!(plain.custom.is_empty());
    assert_eq!(plain.data.as_note().unwrap().body, "no front matter here\n");
}

#[tokio::test]
async fn duplicate_paths_surface_as_conflict() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_note(dir.path(), "foo", "foo-a", "");
    write_note(&dir.path().join("nested"), "foo", "foo-b", "");
    let store = FileStore::with_codecs(
        dir.path(),
        std::sync::Arc::new(notetree::codec::NoteCodec::default()),
        std::sync::Arc::new(notetree::codec::SchemaCodec::new()),
        Default::default(),
        2,
    );
    let err = store.query_all(NodeKind::Note).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn get_reads_cached_note() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    assert!(store.get("ch1").await.unwrap_err().is_not_found());

    store.query_all(NodeKind::Note).await.unwrap();
    let record = store.get("ch1").await.unwrap();
    assert_eq!(record.hierarchical_name, "foo.ch1");
    assert_eq!(record.data.as_note().unwrap().body, "one\n");

    let root = store.get("root").await.unwrap();
    assert_eq!(root.data.as_note().unwrap().body, "home\n");
}

#[tokio::test]
async fn stub_is_not_written_but_cached() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    let tree = store.query_all(NodeKind::Note).await.unwrap();
    let stub_id = tree.get_by_name("bar").unwrap().id.clone();
    fs::remove_file(dir.path().join("bar.baz.md")).unwrap();

    let summary = store
        .write(&tree, &stub_id, WriteOptions::default())
        .await
        .unwrap();
    assert!(summary.written.is_empty());
    assert_eq!(summary.skipped, vec![stub_id.clone()]);
    assert!(!dir.path().join("bar.md").exists());
    assert_eq!(store.cached_path(&stub_id), Some(PathBuf::from("bar.md")));

    let summary = store
        .write(&tree, &stub_id, WriteOptions::recursive())
        .await
        .unwrap();
    assert_eq!(summary.written, vec![PathBuf::from("bar.baz.md")]);
    assert!(!dir.path().join("bar.md").exists());

    let forced = WriteOptions {
        force_persist_stub: true,
        ..Default::default()
    };
    let summary = store.write(&tree, &stub_id, forced).await.unwrap();
    assert_eq!(
        summary.written,
        vec![PathBuf::from("bar.baz.md"), PathBuf::from("bar.md")]
    );
    let text = fs::read_to_string(dir.path().join("bar.md")).unwrap();
    assert!(!text.lines().any(|l| l.starts_with("stub:")));
}

#[tokio::test]
async fn recursive_write_never_deletes_files() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    let mut tree = store.query_all(NodeKind::Note).await.unwrap();
    tree.remove("ch2");

    let summary = store
        .write(&tree, "foo", WriteOptions::recursive())
        .await
        .unwrap();
    assert_eq!(
        summary.written,
        vec![PathBuf::from("foo.ch1.md"), PathBuf::from("foo.md")]
    );
    assert!(dir.path().join("foo.ch2.md").exists());

    let reread = store.query_all(NodeKind::Note).await.unwrap();
    assert_eq!(reread.get("ch1").unwrap().data.as_note().unwrap().body, "one\n");
}

#[tokio::test]
async fn root_cannot_be_deleted() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    store.query_all(NodeKind::Note).await.unwrap();
    let cached = store.cache_len();

    let err = store.delete("root", DeleteOptions::default()).await.unwrap_err();
    assert!(matches!(err, StorageError::IllegalOperation(_)));
    assert!(dir.path().join("root.md").exists());
    assert_eq!(store.cache_len(), cached);
}

#[tokio::test]
async fn delete_removes_single_file_and_cache_entry() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    store.query_all(NodeKind::Note).await.unwrap();

    store.delete("foo", DeleteOptions::default()).await.unwrap();
    assert!(!dir.path().join("foo.md").exists());
    assert!(dir.path().join("foo.ch1.md").exists());
    assert_eq!(store.cached_path("foo"), None);

    let err = store.delete("foo", DeleteOptions::default()).await.unwrap_err();
    assert!(err.is_not_found());

    store
        .delete(
            "anything",
            DeleteOptions {
                explicit_path: Some(PathBuf::from("bar.baz.md")),
            },
        )
        .await
        .unwrap();
    assert!(!dir.path().join("bar.baz.md").exists());
}

#[tokio::test]
async fn only_the_all_query_is_supported() {
    let dir = vault();
    let store = FileStore::new(dir.path());
    let tree = store.query("**/*", NodeKind::Note).await.unwrap();
    assert_eq!(tree.len(), 6);

    let err = store.query("foo.*", NodeKind::Note).await.unwrap_err();
    assert!(matches!(err, StorageError::UnsupportedQuery(_)));
}

#[tokio::test]
async fn schema_modules_round_trip_through_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("foo.schema.yml"),
        "version: 1\nschemas:\n  - id: foo\n    parent: root\n    namespace: true\n    children: [ch1]\n  - id: ch1\n",
    )
    .unwrap();
    let store = FileStore::new(dir.path());
    let tree = store.query_all(NodeKind::Schema).await.unwrap();
    assert_eq!(tree.get("ch1").unwrap().hierarchical_name, "foo.ch1");
    assert_eq!(store.cache_len(), 0);

    let summary = store.write(&tree, "ch1", WriteOptions::default()).await.unwrap();
    assert_eq!(summary.written, vec![PathBuf::from("foo.schema.yml")]);
    let reread = store.query_all(NodeKind::Schema).await.unwrap();
    assert_eq!(reread, tree);
}

fn nested_store(dir: &TempDir) -> FileStore {
    FileStore::with_codecs(
        dir.path(),
        std::sync::Arc::new(notetree::codec::NoteCodec::default()),
        std::sync::Arc::new(notetree::codec::SchemaCodec::new()),
        Default::default(),
        2,
    )
}

#[tokio::test]
async fn nested_notes_are_read_written_and_deleted_in_place() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    write_note(&dir.path().join("sub"), "foo", "foo", "nested\n");
    let store = nested_store(&dir);

    let tree = store.query_all(NodeKind::Note).await.unwrap();
    assert_eq!(store.cached_path("foo"), Some(PathBuf::from("sub/foo.md")));
    let record = store.get("foo").await.unwrap();
    assert_eq!(record.data.as_note().unwrap().body, "nested\n");

    let summary = store.write(&tree, "foo", WriteOptions::default()).await.unwrap();
    assert_eq!(summary.written, vec![PathBuf::from("sub/foo.md")]);
    assert!(!dir.path().join("foo.md").exists());

    store.delete("foo", DeleteOptions::default()).await.unwrap();
    assert!(!dir.path().join("sub").join("foo.md").exists());
    assert_eq!(store.cached_path("foo"), None);
}

#[tokio::test]
async fn note_titled_root_does_not_replace_the_root() {
    let dir = TempDir::new().unwrap();
    write_note(dir.path(), "root", "home", "");
    write_note(dir.path(), "foo", "foo", "");
    let store = FileStore::new(dir.path());
    let mut tree = store.query_all(NodeKind::Note).await.unwrap();

    let mut record = notetree::RawNodeRecord::note("leaf", "foo.root");
    record.title = "root".to_string();
    tree.insert(record).unwrap();
    store.write(&tree, "leaf", WriteOptions::default()).await.unwrap();
    assert_eq!(store.root_id(), "home");

    let err = store.delete("home", DeleteOptions::default()).await.unwrap_err();
    assert!(matches!(err, StorageError::IllegalOperation(_)));
    assert!(dir.path().join("root.md").exists());

    store.delete("leaf", DeleteOptions::default()).await.unwrap();
    assert!(!dir.path().join("foo.root.md").exists());
}
