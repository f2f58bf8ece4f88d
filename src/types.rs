//! Core types for the hierarchical note/schema store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// NodeId: identifier of a note or schema node, unique within one node kind
pub type NodeId = String;

/// Open mapping of user-defined metadata carried by a node
pub type CustomData = BTreeMap<String, serde_json::Value>;

/// Reserved hierarchical name (and title) of the tree root
pub const ROOT_NAME: &str = "root";

/// Separator between hierarchical name segments
pub const NAME_SEPARATOR: char = '.';

/// Node kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Note,
    Schema,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Note => "note",
            NodeKind::Schema => "schema",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Note-specific payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    pub body: String,
    pub desc: Option<String>,
    /// Creation time, epoch milliseconds
    pub created: Option<i64>,
    /// Last update time, epoch milliseconds
    pub updated: Option<i64>,
}

/// Schema-specific payload: matching directives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaData {
    /// Match this node's own segment and every descendant path under it
    #[serde(default)]
    pub namespace: bool,
    /// Segment this schema matches; defaults to the schema id
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

/// Kind-tagged payload shared by records and tree nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeData {
    Note(NoteData),
    Schema(SchemaData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Note(_) => NodeKind::Note,
            NodeData::Schema(_) => NodeKind::Schema,
        }
    }

    /// Empty payload for a node of the given kind (used for stubs)
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Note => NodeData::Note(NoteData::default()),
            NodeKind::Schema => NodeData::Schema(SchemaData::default()),
        }
    }

    pub fn as_note(&self) -> Option<&NoteData> {
        match self {
            NodeData::Note(data) => Some(data),
            NodeData::Schema(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaData> {
        match self {
            NodeData::Schema(data) => Some(data),
            NodeData::Note(_) => None,
        }
    }
}

/// RawNodeRecord: one decoded file entry, before tree construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNodeRecord {
    pub id: NodeId,
    pub hierarchical_name: String,
    pub title: String,
    /// Optional explicit parent link; the hierarchical name wins on disagreement
    #[serde(default)]
    pub parent_ref: Option<NodeId>,
    #[serde(default)]
    pub child_refs: Vec<NodeId>,
    pub data: NodeData,
    #[serde(default)]
    pub custom: CustomData,
}

impl RawNodeRecord {
    /// Note record whose id and title default to the hierarchical name
    pub fn note(id: impl Into<NodeId>, hierarchical_name: impl Into<String>) -> Self {
        let hierarchical_name = hierarchical_name.into();
        Self {
            id: id.into(),
            title: hierarchical_name.clone(),
            hierarchical_name,
            parent_ref: None,
            child_refs: Vec::new(),
            data: NodeData::Note(NoteData::default()),
            custom: CustomData::new(),
        }
    }

    /// Schema record with the given matching directives
    pub fn schema(
        id: impl Into<NodeId>,
        hierarchical_name: impl Into<String>,
        data: SchemaData,
    ) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            hierarchical_name: hierarchical_name.into(),
            parent_ref: None,
            child_refs: Vec::new(),
            data: NodeData::Schema(data),
            custom: CustomData::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// Schema assignment attached to a note by the engine; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaAssignment {
    pub module_id: String,
    pub schema_id: NodeId,
}

/// Split a hierarchical name into its segments.
///
/// The reserved root name and the empty string have no segments.
pub fn name_segments(name: &str) -> Vec<&str> {
    if name.is_empty() || name == ROOT_NAME {
        return Vec::new();
    }
    name.split(NAME_SEPARATOR).collect()
}

/// Dotted prefix of the parent of `name`, or `None` for the root
pub fn parent_name(name: &str) -> Option<String> {
    let segments = name_segments(name);
    if segments.is_empty() {
        return None;
    }
    Some(segments[..segments.len() - 1].join("."))
}

/// Last segment of a hierarchical name
pub fn last_segment(name: &str) -> &str {
    if name.is_empty() {
        return ROOT_NAME;
    }
    name.rsplit(NAME_SEPARATOR).next().unwrap_or(name)
}

/// Canonical form used as the key of the name index: the root is ""
pub fn canonical_name(name: &str) -> String {
    name_segments(name).join(".")
}
