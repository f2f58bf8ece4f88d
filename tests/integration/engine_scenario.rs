use std::fs;
use std::sync::Arc;

use notetree::store::{FileStore, NodeStore, WriteOptions};
use notetree::types::{NodeKind, SchemaAssignment};
use notetree::{match_path, Engine};
use tempfile::TempDir;

use crate::integration::support::{schema, write_note};

fn foo_vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_note(dir.path(), "foo", "foo", "");
    write_note(dir.path(), "foo.ch1", "ch1", "");
    write_note(dir.path(), "foo.ch2", "ch2", "");
    fs::write(
        dir.path().join("foo.schema.yml"),
        "version: 1\nschemas:\n  - id: foo\n    parent: root\n    namespace: true\n",
    )
    .unwrap();
    dir
}

fn assignment(module: &str, schema: &str) -> SchemaAssignment {
    SchemaAssignment {
        module_id: module.to_string(),
        schema_id: schema.to_string(),
    }
}

#[tokio::test]
async fn foo_vault_end_to_end() {
    let dir = foo_vault();
    let store = Arc::new(FileStore::new(dir.path()));
    let mut engine = Engine::new(store.clone());
    engine.init().await.unwrap();

    let notes = engine.notes();
    assert_eq!(notes.len(), 4);
    assert_eq!(notes.descendants("foo").len(), 3);
    assert_eq!(notes.root().unwrap().child_ids, vec!["foo"]);

    let found = match_path("foo.ch1", engine.modules()).unwrap();
    assert_eq!(found.module_id, "foo");
    assert_eq!(found.schema.id(), "foo");
    assert!(found.namespace);

    assert_eq!(engine.schema_for("ch1"), Some(&assignment("foo", "foo")));
    assert_eq!(engine.schema_for("foo"), Some(&assignment("foo", "foo")));
    assert_eq!(engine.schema_for("root"), None);

    // Deleting the parent keeps its children under a stub
    engine.delete_note("foo").await.unwrap();
    assert!(!dir.path().join("foo.md").exists());
    assert!(engine.notes().get_by_name("foo").unwrap().is_stub);
    assert_eq!(engine.schema_for("foo"), None);

    let err = engine.delete_note("root").await.unwrap_err();
    assert!(matches!(err, notetree::StorageError::IllegalOperation(_)));
}

#[tokio::test]
async fn create_note_writes_note_and_caches_stubs() {
    let dir = foo_vault();
    let store = Arc::new(FileStore::new(dir.path()));
    let mut engine = Engine::new(store.clone());
    engine.init().await.unwrap();

    let id = engine
        .create_note("bond.ch1.gch1", "hello\n", WriteOptions::default())
        .await
        .unwrap();
    assert!(dir.path().join("bond.ch1.gch1.md").exists());
    assert!(!dir.path().join("bond.md").exists());
    assert!(!dir.path().join("bond.ch1.md").exists());

    let bond = engine.notes().get_by_name("bond").unwrap();
    assert!(bond.is_stub);
    assert_eq!(store.cached_path(&bond.id).unwrap().to_str(), Some("bond.md"));

    let record = store.get(&id).await.unwrap();
    let data = record.data.as_note().unwrap();
    assert_eq!(data.body, "hello\n");
    assert!(data.created.is_some());
    assert_eq!(data.created, data.updated);
    assert_eq!(engine.schema_for(&id), None);

    let err = engine
        .create_note("foo.ch1", "", WriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, notetree::StorageError::Conflict(_)));
}

#[tokio::test]
async fn schema_update_reassigns_notes() {
    let dir = foo_vault();
    let store = Arc::new(FileStore::new(dir.path()));
    let mut engine = Engine::new(store.clone());
    engine.init().await.unwrap();
    engine
        .create_note("bond.ch1", "", WriteOptions::default())
        .await
        .unwrap();

    let summary = engine
        .update_schema(vec![
            schema("bond", "bond", true),
            schema("bond-ch1", "bond.ch1", false),
        ])
        .await
        .unwrap();
    assert_eq!(summary.written.len(), 1);
    assert!(dir.path().join("bond.schema.yml").exists());

    let ch1 = engine.notes().get_by_name("bond.ch1").unwrap().id.clone();
    assert_eq!(engine.schema_for(&ch1), Some(&assignment("bond", "bond-ch1")));
    assert_eq!(engine.schema_for("ch1"), Some(&assignment("foo", "foo")));

    let schemas = store.query_all(NodeKind::Schema).await.unwrap();
    assert_eq!(schemas.get("bond-ch1").unwrap().hierarchical_name, "bond.ch1");
    assert!(schemas.get("foo").is_some());
}

#[tokio::test]
async fn created_note_named_root_leaves_root_protected() {
    let dir = foo_vault();
    write_note(dir.path(), "root", "home", "");
    let store = Arc::new(FileStore::new(dir.path()));
    let mut engine = Engine::new(store.clone());
    engine.init().await.unwrap();

    let id = engine
        .create_note("foo.root", "", WriteOptions::default())
        .await
        .unwrap();
    assert!(!store.is_root(&id));
    assert!(engine.delete_note("home").await.is_err());
    assert!(dir.path().join("root.md").exists());

    let err = engine
        .create_note("root.x", "", WriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, notetree::StorageError::Conflict(_)));
}
