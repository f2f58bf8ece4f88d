//! Schema module files (`<domain>.schema.yml`)
//!
//! One file holds one module: a flat list of schema entries whose structure
//! is given by `children` id lists starting at the module root. Hierarchical
//! names are derived from that structure so schema nodes land in the schema
//! tree under their domain.

use crate::codec::NodeCodec;
use crate::error::{DecodeError, StorageError};
use crate::tree::{Node, NodeTree};
use crate::types::{
    canonical_name, CustomData, NodeData, NodeId, NodeKind, RawNodeRecord, SchemaData, ROOT_NAME,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const SCHEMA_VERSION: u32 = 1;

/// On-disk module layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub schemas: Vec<SchemaEntry>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

/// One schema entry in a module file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub namespace: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(flatten)]
    pub custom: CustomData,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SchemaEntry {
    fn segment(&self) -> &str {
        self.pattern.as_deref().unwrap_or(&self.id)
    }

    fn from_node(node: &Node, module_root: bool) -> Self {
        let data = node.data.as_schema().cloned().unwrap_or_default();
        let segment = node.segment().to_string();
        Self {
            id: node.id.clone(),
            title: (node.title != node.id).then(|| node.title.clone()),
            parent: module_root.then(|| ROOT_NAME.to_string()),
            children: node.child_ids.clone(),
            pattern: (segment != node.id).then_some(segment),
            namespace: data.namespace,
            desc: data.desc,
            custom: node.custom.clone(),
        }
    }
}

/// YAML schema module codec
#[derive(Debug, Clone, Default)]
pub struct SchemaCodec;

impl SchemaCodec {
    pub fn new() -> Self {
        Self
    }

    /// Parse module text into records, deriving names from `children` links
    pub fn parse_module(&self, domain: &str, text: &str) -> Result<Vec<RawNodeRecord>, DecodeError> {
        let file: SchemaFile =
            serde_yaml::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        if file.schemas.is_empty() {
            return Ok(Vec::new());
        }

        let entries: BTreeMap<&str, &SchemaEntry> =
            file.schemas.iter().map(|e| (e.id.as_str(), e)).collect();
        if entries.len() != file.schemas.len() {
            return Err(DecodeError::Malformed(format!(
                "duplicate schema ids in module '{domain}'"
            )));
        }
        let root = file
            .schemas
            .iter()
            .find(|e| e.parent.as_deref() == Some(ROOT_NAME))
            .or_else(|| entries.get(domain).copied())
            .or_else(|| file.schemas.first())
            .ok_or_else(|| DecodeError::Malformed("module has no root schema".to_string()))?;

        let mut records = Vec::with_capacity(file.schemas.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&SchemaEntry, String, Option<NodeId>)> =
            vec![(root, root.segment().to_string(), None)];
        while let Some((entry, name, parent)) = stack.pop() {
            if !visited.insert(entry.id.as_str()) {
                tracing::warn!(module = domain, id = %entry.id, "Schema entry reached twice, skipping");
                continue;
            }
            for child_id in entry.children.iter().rev() {
                match entries.get(child_id.as_str()).copied() {
                    Some(child) => {
                        let child_name = join_name(&name, child.segment());
                        stack.push((child, child_name, Some(entry.id.clone())));
                    }
                    None => tracing::warn!(
                        module = domain,
                        parent = %entry.id,
                        child = %child_id,
                        "Schema child not defined in module"
                    ),
                }
            }
            records.push(RawNodeRecord {
                id: entry.id.clone(),
                hierarchical_name: name,
                title: entry.title.clone().unwrap_or_else(|| entry.id.clone()),
                parent_ref: parent.or_else(|| entry.parent.clone()),
                child_refs: entry.children.clone(),
                data: NodeData::Schema(SchemaData {
                    namespace: entry.namespace,
                    pattern: entry.pattern.clone(),
                    desc: entry.desc.clone(),
                }),
                custom: entry.custom.clone(),
            });
        }

        for entry in &file.schemas {
            if !visited.contains(entry.id.as_str()) {
                tracing::warn!(module = domain, id = %entry.id, "Schema entry unreachable from module root, skipping");
            }
        }
        Ok(records)
    }

    /// Module root holding `node`: the ancestor directly under the tree root
    fn module_root<'a>(&self, tree: &'a NodeTree, node: &'a Node) -> &'a Node {
        if node.is_root() {
            return node;
        }
        let mut current = node;
        for ancestor in tree.ancestors(&node.id) {
            if ancestor.is_root() {
                break;
            }
            current = ancestor;
        }
        current
    }
}

impl NodeCodec for SchemaCodec {
    fn kind(&self) -> NodeKind {
        NodeKind::Schema
    }

    fn suffix(&self) -> &'static str {
        ".schema.yml"
    }

    fn decode(&self, path: &Path, text: &str) -> Result<Vec<RawNodeRecord>, DecodeError> {
        if text.trim().is_empty() {
            return Err(DecodeError::MissingHeader);
        }
        self.parse_module(&self.stem(path), text)
    }

    fn decode_without_header(&self, _path: &Path, _text: &str) -> Vec<RawNodeRecord> {
        Vec::new()
    }

    fn encode(&self, tree: &NodeTree, node: &Node) -> Result<String, StorageError> {
        let module_root = self.module_root(tree, node);
        let schemas = if module_root.is_root() {
            // module roots live in their own files
            let mut entry = SchemaEntry::from_node(module_root, false);
            entry.children.clear();
            vec![entry]
        } else {
            tree.descendants(&module_root.id)
                .into_iter()
                .map(|n| SchemaEntry::from_node(n, n.id == module_root.id))
                .collect()
        };
        let file = SchemaFile {
            version: SCHEMA_VERSION,
            schemas,
        };
        serde_yaml::to_string(&file).map_err(|e| StorageError::Encode {
            id: node.id.clone(),
            message: e.to_string(),
        })
    }

    fn relative_path(&self, tree: &NodeTree, node: &Node) -> PathBuf {
        let module_root = self.module_root(tree, node);
        PathBuf::from(format!("{}{}", module_root.segment(), self.suffix()))
    }
}

fn join_name(parent: &str, segment: &str) -> String {
    let parent = canonical_name(parent);
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}
