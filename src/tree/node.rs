//! Tree node representation

use crate::tree::hasher::stub_id;
use crate::types::{
    canonical_name, last_segment, CustomData, NodeData, NodeId, NodeKind, RawNodeRecord,
    ROOT_NAME,
};
use serde::{Deserialize, Serialize};

/// Node: one element of a note or schema tree
///
/// `parent_id` is a back-reference by id; the tree owns every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub hierarchical_name: String,
    pub title: String,
    pub is_stub: bool,
    pub parent_id: Option<NodeId>,
    /// Child ids ordered by hierarchical name
    pub child_ids: Vec<NodeId>,
    pub data: NodeData,
    pub custom: CustomData,
}

impl Node {
    /// Build a real node from a decoded record; explicit refs are not copied
    pub fn from_record(record: RawNodeRecord, parent_id: Option<NodeId>) -> Self {
        let hierarchical_name = if canonical_name(&record.hierarchical_name).is_empty() {
            ROOT_NAME.to_string()
        } else {
            record.hierarchical_name
        };
        Self {
            id: record.id,
            hierarchical_name,
            title: record.title,
            is_stub: false,
            parent_id,
            child_ids: Vec::new(),
            data: record.data,
            custom: record.custom,
        }
    }

    /// Synthesize a stub for a path segment with no backing file
    pub fn stub(kind: NodeKind, hierarchical_name: &str, parent_id: Option<NodeId>) -> Self {
        Self {
            id: stub_id(kind, hierarchical_name),
            hierarchical_name: hierarchical_name.to_string(),
            title: last_segment(hierarchical_name).to_string(),
            is_stub: true,
            parent_id,
            child_ids: Vec::new(),
            data: NodeData::empty(kind),
            custom: CustomData::new(),
        }
    }

    /// Synthesized root used when no record claims the root path
    pub fn synthesized_root(kind: NodeKind) -> Self {
        Self {
            id: ROOT_NAME.to_string(),
            hierarchical_name: ROOT_NAME.to_string(),
            title: ROOT_NAME.to_string(),
            is_stub: false,
            parent_id: None,
            child_ids: Vec::new(),
            data: NodeData::empty(kind),
            custom: CustomData::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Key of this node in the tree's name index ("" for the root)
    pub fn canonical_name(&self) -> String {
        canonical_name(&self.hierarchical_name)
    }

    /// Own path segment: the last segment of the hierarchical name
    pub fn segment(&self) -> &str {
        last_segment(&self.hierarchical_name)
    }

    /// Convert back into a record, with explicit refs filled from the tree links
    pub fn to_record(&self) -> RawNodeRecord {
        RawNodeRecord {
            id: self.id.clone(),
            hierarchical_name: self.hierarchical_name.clone(),
            title: self.title.clone(),
            parent_ref: self.parent_id.clone(),
            child_refs: self.child_ids.clone(),
            data: self.data.clone(),
            custom: self.custom.clone(),
        }
    }
}
