use std::fs;
use std::path::Path;

use notetree::types::{NodeKind, RawNodeRecord, SchemaData};
use notetree::{build_tree, NodeTree, SchemaModule};
use std::collections::BTreeMap;

pub fn write_note(dir: &Path, name: &str, id: &str, body: &str) {
    fs::write(
        dir.join(format!("{name}.md")),
        format!("---\nid: {id}\ntitle: {name}\n---\n{body}"),
    )
    .unwrap();
}

pub fn schema(id: &str, name: &str, namespace: bool) -> RawNodeRecord {
    RawNodeRecord::schema(
        id,
        name,
        SchemaData {
            namespace,
            ..Default::default()
        },
    )
}

pub fn modules(records: Vec<RawNodeRecord>) -> BTreeMap<String, SchemaModule> {
    let tree: NodeTree = build_tree(NodeKind::Schema, records).unwrap();
    SchemaModule::from_tree(&tree)
}
