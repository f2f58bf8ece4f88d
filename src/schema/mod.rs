//! Schema Modules
//!
//! A schema module is the subtree of the schema tree under one domain (one
//! first-level path segment). Modules are derived from a built schema tree
//! and looked up by the matcher; they never reference the note tree.

pub mod matcher;

pub use matcher::{match_path, SchemaMatch};

use crate::tree::{Node, NodeTree};
use crate::types::{NodeId, SchemaData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema node with its matching directives unpacked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub node: Node,
    pub data: SchemaData,
}

impl SchemaNode {
    pub fn from_node(node: &Node) -> Self {
        Self {
            data: node.data.as_schema().cloned().unwrap_or_default(),
            node: node.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// The path segment this schema node matches
    pub fn segment(&self) -> &str {
        self.node.segment()
    }

    pub fn is_namespace(&self) -> bool {
        self.data.namespace
    }
}

/// SchemaModule: one domain's schema subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaModule {
    pub module_id: String,
    pub root: Node,
    /// schema id -> schema node, including the module root
    pub schemas: BTreeMap<NodeId, SchemaNode>,
}

impl SchemaModule {
    /// Build a module from the subtree rooted at `root_id`
    pub fn from_subtree(tree: &NodeTree, root_id: &str) -> Option<Self> {
        let root = tree.get(root_id)?.clone();
        let schemas = tree
            .descendants(root_id)
            .into_iter()
            .map(|n| (n.id.clone(), SchemaNode::from_node(n)))
            .collect();
        Some(Self {
            module_id: root.segment().to_string(),
            root,
            schemas,
        })
    }

    /// Split a schema tree into modules keyed by module id (the domain)
    pub fn from_tree(tree: &NodeTree) -> BTreeMap<String, SchemaModule> {
        tree.children(tree.root_id())
            .into_iter()
            .filter_map(|domain| Self::from_subtree(tree, &domain.id))
            .map(|module| (module.module_id.clone(), module))
            .collect()
    }

    /// Domain name: the single path segment of the module root
    pub fn domain(&self) -> &str {
        self.root.segment()
    }

    pub fn root_schema(&self) -> Option<&SchemaNode> {
        self.schemas.get(&self.root.id)
    }

    pub fn get(&self, schema_id: &str) -> Option<&SchemaNode> {
        self.schemas.get(schema_id)
    }

    pub fn children<'a>(&'a self, schema: &'a SchemaNode) -> impl Iterator<Item = &'a SchemaNode> {
        schema
            .node
            .child_ids
            .iter()
            .filter_map(move |id| self.schemas.get(id))
    }
}
