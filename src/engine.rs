//! Engine
//!
//! Holds the in-memory note and schema trees on top of a [`NodeStore`] and
//! keeps schema assignments for notes. Assignments live here, outside both
//! trees, and are recomputed whenever either tree changes.

use crate::error::StorageError;
use crate::schema::{match_path, SchemaModule};
use crate::store::{DeleteOptions, NodeStore, WriteOptions, WriteSummary};
use crate::tree::{build_tree, NodeTree};
use crate::types::{
    canonical_name, name_segments, NodeData, NodeId, NodeKind, NoteData, RawNodeRecord,
    SchemaAssignment,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Engine {
    store: Arc<dyn NodeStore>,
    notes: NodeTree,
    schemas: NodeTree,
    modules: BTreeMap<String, SchemaModule>,
    assignments: BTreeMap<NodeId, SchemaAssignment>,
}

impl Engine {
    /// Engine with empty trees; call [`Engine::init`] to load the vault
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self {
            store,
            notes: NodeTree::new(NodeKind::Note),
            schemas: NodeTree::new(NodeKind::Schema),
            modules: BTreeMap::new(),
            assignments: BTreeMap::new(),
        }
    }

    /// Load schemas, then notes, then assign a schema to every note
    pub async fn init(&mut self) -> Result<(), StorageError> {
        self.schemas = self.store.query_all(NodeKind::Schema).await?;
        self.modules = SchemaModule::from_tree(&self.schemas);
        self.notes = self.store.query_all(NodeKind::Note).await?;
        self.assign_schemas();
        info!(
            notes = self.notes.len(),
            modules = self.modules.len(),
            assigned = self.assignments.len(),
            "Engine initialized"
        );
        Ok(())
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    pub fn notes(&self) -> &NodeTree {
        &self.notes
    }

    pub fn schemas(&self) -> &NodeTree {
        &self.schemas
    }

    pub fn modules(&self) -> &BTreeMap<String, SchemaModule> {
        &self.modules
    }

    pub fn assignments(&self) -> &BTreeMap<NodeId, SchemaAssignment> {
        &self.assignments
    }

    pub fn schema_for(&self, id: &str) -> Option<&SchemaAssignment> {
        self.assignments.get(id)
    }

    /// Recompute the assignment of every note
    pub fn assign_schemas(&mut self) {
        let modules = &self.modules;
        self.assignments = self
            .notes
            .iter()
            .filter_map(|note| {
                assignment_for(&note.canonical_name(), modules).map(|a| (note.id.clone(), a))
            })
            .collect();
    }

    /// Create a note at `name`, stamping creation and update times.
    ///
    /// Stub ancestors the note implies are written with the same options,
    /// so they are persisted only when the options ask for it.
    pub async fn create_note(
        &mut self,
        name: &str,
        body: &str,
        options: WriteOptions,
    ) -> Result<NodeId, StorageError> {
        let name = canonical_name(name);
        if name_segments(&name).is_empty() {
            return Err(StorageError::IllegalOperation(
                "cannot create a note at the root path".to_string(),
            ));
        }
        let now = chrono::Utc::now().timestamp_millis();
        let mut record = RawNodeRecord::note(new_note_id(&name, now), name.as_str());
        record.title = crate::types::last_segment(&name).to_string();
        record.data = NodeData::Note(NoteData {
            body: body.to_string(),
            desc: None,
            created: Some(now),
            updated: Some(now),
        });

        let mut notes = self.notes.clone();
        let id = notes.insert(record)?;
        self.store.write(&notes, &id, options).await?;
        let stubs: Vec<NodeId> = notes
            .ancestors(&id)
            .into_iter()
            .filter(|n| n.is_stub)
            .map(|n| n.id.clone())
            .collect();
        for stub in &stubs {
            let stub_options = WriteOptions {
                write_as_stub: options.persists(true),
                ..WriteOptions::default()
            };
            self.store.write(&notes, stub, stub_options).await?;
        }
        self.notes = notes;

        if let Some(assignment) = assignment_for(&name, &self.modules) {
            self.assignments.insert(id.clone(), assignment);
        }
        debug!(id = %id, name = %name, stubs = stubs.len(), "Created note");
        Ok(id)
    }

    /// Replace one schema module with `records`, write it and reassign every note.
    ///
    /// All records must belong to the same domain.
    pub async fn update_schema(
        &mut self,
        records: Vec<RawNodeRecord>,
    ) -> Result<WriteSummary, StorageError> {
        let domain = module_domain(&records)?;
        let mut merged: Vec<RawNodeRecord> = self
            .schemas
            .iter()
            .filter(|n| !n.is_stub)
            .filter(|n| name_segments(&n.hierarchical_name).first() != Some(&domain.as_str()))
            .map(|n| n.to_record())
            .collect();
        merged.extend(records);

        let schemas = build_tree(NodeKind::Schema, merged)?;
        let module_root = schemas
            .get_by_name(&domain)
            .map(|n| n.id.clone())
            .ok_or_else(|| StorageError::NotFound(format!("schema module '{domain}'")))?;
        let summary = self
            .store
            .write(&schemas, &module_root, WriteOptions::default())
            .await?;

        self.schemas = schemas;
        self.modules = SchemaModule::from_tree(&self.schemas);
        self.assign_schemas();
        info!(module = %domain, assigned = self.assignments.len(), "Schema module updated");
        Ok(summary)
    }

    /// Delete a note file and drop it from the tree
    pub async fn delete_note(&mut self, id: &str) -> Result<(), StorageError> {
        self.store.delete(id, DeleteOptions::default()).await?;
        self.notes.remove(id);
        self.assignments.remove(id);
        Ok(())
    }
}

fn assignment_for(
    note_name: &str,
    modules: &BTreeMap<String, SchemaModule>,
) -> Option<SchemaAssignment> {
    match_path(note_name, modules).map(|m| SchemaAssignment {
        module_id: m.module_id.to_string(),
        schema_id: m.schema.id().to_string(),
    })
}

fn module_domain(records: &[RawNodeRecord]) -> Result<String, StorageError> {
    let mut domains = records
        .iter()
        .map(|r| name_segments(&r.hierarchical_name).first().map(|s| s.to_string()));
    let first = domains
        .next()
        .flatten()
        .ok_or_else(|| StorageError::IllegalOperation("empty schema module".to_string()))?;
    if domains.any(|d| d.as_deref() != Some(first.as_str())) {
        return Err(StorageError::IllegalOperation(
            "schema records span more than one module".to_string(),
        ));
    }
    Ok(first)
}

/// Fresh note id from the note name and creation time
fn new_note_id(name: &str, created: i64) -> NodeId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(name.as_bytes());
    hasher.update(&[0]);
    hasher.update(&created.to_le_bytes());
    hex::encode(&hasher.finalize().as_bytes()[..10])
}
