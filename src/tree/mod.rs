//! Node Trees
//!
//! In-memory trees of notes or schemas keyed by hierarchical name. A tree owns
//! its nodes in an id-keyed map; parent and child links are ids. Structure is
//! derived from hierarchical names only, with stub nodes filling any path
//! segment that no record defines.

pub mod builder;
pub mod hasher;
pub mod node;

pub use builder::build_tree;
pub use node::Node;

use crate::error::BuildError;
use crate::types::{canonical_name, parent_name, NodeId, NodeKind, RawNodeRecord};
use std::collections::BTreeMap;

/// NodeTree: one rooted tree per node kind
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    kind: NodeKind,
    root_id: NodeId,
    /// Whether the root was synthesized and may still be replaced by a record
    synthesized_root: bool,
    nodes: BTreeMap<NodeId, Node>,
    /// canonical hierarchical name -> id
    names: BTreeMap<String, NodeId>,
}

impl NodeTree {
    /// Create a tree holding only a synthesized root
    pub fn new(kind: NodeKind) -> Self {
        let root = Node::synthesized_root(kind);
        let mut tree = Self {
            kind,
            root_id: root.id.clone(),
            synthesized_root: true,
            nodes: BTreeMap::new(),
            names: BTreeMap::new(),
        };
        tree.names.insert(String::new(), root.id.clone());
        tree.nodes.insert(root.id.clone(), root);
        tree
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Node> {
        self.names
            .get(&canonical_name(name))
            .and_then(|id| self.nodes.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Direct children in hierarchical-name order
    pub fn children(&self, id: &str) -> Vec<&Node> {
        self.nodes
            .get(id)
            .map(|node| {
                node.child_ids
                    .iter()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The node and all of its descendants, pre-order
    pub fn descendants(&self, id: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(node);
            for child in node.child_ids.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Ancestors from the immediate parent up to the root
    pub fn ancestors(&self, id: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(id).and_then(|n| n.parent_id.as_deref());
        while let Some(parent_id) = current {
            let Some(parent) = self.nodes.get(parent_id) else {
                break;
            };
            out.push(parent);
            current = parent.parent_id.as_deref();
            if out.len() > self.nodes.len() {
                break;
            }
        }
        out
    }

    /// Insert a record, synthesizing stub ancestors or promoting an existing stub.
    ///
    /// Returns the id the record occupies in the tree.
    pub fn insert(&mut self, record: RawNodeRecord) -> Result<NodeId, BuildError> {
        let found = record.kind();
        if found != self.kind {
            return Err(BuildError::KindMismatch {
                id: record.id,
                expected: self.kind,
                found,
            });
        }
        if is_under_reserved_root(&record.hierarchical_name) {
            return Err(BuildError::ReservedName {
                kind: self.kind,
                name: record.hierarchical_name,
            });
        }
        let name = canonical_name(&record.hierarchical_name);

        if let Some(existing_id) = self.names.get(&name).cloned() {
            let replaceable = self
                .nodes
                .get(&existing_id)
                .map(|n| n.is_stub || (name.is_empty() && self.synthesized_root))
                .unwrap_or(true);
            if !replaceable {
                let (first, second) = ordered_pair(existing_id, record.id);
                return Err(BuildError::DuplicatePath {
                    kind: self.kind,
                    name: display_name(&name),
                    first,
                    second,
                });
            }
            if record.id != existing_id {
                self.check_unique_id(&record)?;
            }
            return Ok(self.promote(&existing_id, record));
        }

        self.check_unique_id(&record)?;
        let parent_id = self.ensure_path(&parent_name(&name).unwrap_or_default());
        if let Some(explicit) = &record.parent_ref {
            if explicit != &parent_id {
                tracing::debug!(
                    id = %record.id,
                    explicit_parent = %explicit,
                    structural_parent = %parent_id,
                    "Ignoring explicit parent that disagrees with hierarchical name"
                );
            }
        }
        let node = Node::from_record(record, Some(parent_id.clone()));
        let id = node.id.clone();
        self.names.insert(name, id.clone());
        self.nodes.insert(id.clone(), node);
        self.link_child(&parent_id, &id);
        Ok(id)
    }

    /// Remove a node. The root is never removed.
    ///
    /// A node that still has children is replaced by a stub at the same path;
    /// a childless node is unlinked and any stub ancestors it leaves without
    /// children are pruned.
    pub fn remove(&mut self, id: &str) -> Option<Node> {
        if id == self.root_id {
            return None;
        }
        let node = self.nodes.remove(id)?;
        let name = node.canonical_name();
        self.names.remove(&name);
        let parent_id = node.parent_id.clone().unwrap_or_else(|| self.root_id.clone());

        if !node.child_ids.is_empty() {
            let mut stub = Node::stub(self.kind, &node.hierarchical_name, Some(parent_id.clone()));
            stub.child_ids = node.child_ids.clone();
            let stub_id = stub.id.clone();
            for child in &stub.child_ids {
                if let Some(c) = self.nodes.get_mut(child) {
                    c.parent_id = Some(stub_id.clone());
                }
            }
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                for child in parent.child_ids.iter_mut() {
                    if child == id {
                        *child = stub_id.clone();
                    }
                }
            }
            self.names.insert(name, stub_id.clone());
            self.nodes.insert(stub_id, stub);
            return Some(node);
        }

        self.unlink_child(&parent_id, id);
        let mut current = parent_id;
        loop {
            let prune = self
                .nodes
                .get(&current)
                .map(|n| n.is_stub && n.child_ids.is_empty() && !n.is_root())
                .unwrap_or(false);
            if !prune {
                break;
            }
            let Some(stub) = self.nodes.remove(&current) else {
                break;
            };
            self.names.remove(&stub.canonical_name());
            let Some(next) = stub.parent_id else {
                break;
            };
            self.unlink_child(&next, &current);
            current = next;
        }
        Some(node)
    }

    /// Check the structural invariants: single root, resolvable parents,
    /// child lists matching parent links, no cycles, name index in sync.
    pub fn validate(&self) -> Result<(), String> {
        let roots: Vec<&Node> = self.nodes.values().filter(|n| n.is_root()).collect();
        if roots.len() != 1 || roots[0].id != self.root_id {
            return Err(format!("expected a single root '{}', found {}", self.root_id, roots.len()));
        }
        if roots[0].is_stub {
            return Err("root must not be a stub".to_string());
        }
        for node in self.nodes.values() {
            if node.kind() != self.kind {
                return Err(format!("node {} has kind {}", node.id, node.kind()));
            }
            if let Some(parent_id) = &node.parent_id {
                let parent = self
                    .nodes
                    .get(parent_id)
                    .ok_or_else(|| format!("node {} has dangling parent {}", node.id, parent_id))?;
                if !parent.child_ids.contains(&node.id) {
                    return Err(format!("parent {} does not list child {}", parent_id, node.id));
                }
            }
            for child in &node.child_ids {
                let c = self
                    .nodes
                    .get(child)
                    .ok_or_else(|| format!("node {} lists missing child {}", node.id, child))?;
                if c.parent_id.as_deref() != Some(node.id.as_str()) {
                    return Err(format!("child {} does not point back to {}", child, node.id));
                }
            }
            if self.ancestors(&node.id).len() >= self.nodes.len() {
                return Err(format!("cycle through {}", node.id));
            }
            if self.names.get(&node.canonical_name()) != Some(&node.id) {
                return Err(format!("name index out of sync for {}", node.id));
            }
        }
        if self.names.len() != self.nodes.len() {
            return Err("name index size differs from node count".to_string());
        }
        Ok(())
    }

    /// Create stubs for every missing prefix of `name` and return the id at `name`
    fn ensure_path(&mut self, name: &str) -> NodeId {
        let mut missing = Vec::new();
        let mut current = name.to_string();
        let mut anchor = loop {
            if let Some(id) = self.names.get(&current) {
                break id.clone();
            }
            missing.push(current.clone());
            match parent_name(&current) {
                Some(parent) => current = parent,
                None => break self.root_id.clone(),
            }
        };
        for prefix in missing.into_iter().rev() {
            let stub = Node::stub(self.kind, &prefix, Some(anchor.clone()));
            let stub_id = stub.id.clone();
            tracing::debug!(kind = %self.kind, name = %prefix, id = %stub_id, "Synthesized stub");
            self.names.insert(prefix, stub_id.clone());
            self.nodes.insert(stub_id.clone(), stub);
            self.link_child(&anchor, &stub_id);
            anchor = stub_id;
        }
        anchor
    }

    /// Replace the node at `existing_id` with a real node built from `record`,
    /// keeping its position and repointing its children.
    fn promote(&mut self, existing_id: &str, record: RawNodeRecord) -> NodeId {
        let Some(old) = self.nodes.remove(existing_id) else {
            return existing_id.to_string();
        };
        let mut node = Node::from_record(record, old.parent_id.clone());
        node.child_ids = old.child_ids;
        let new_id = node.id.clone();
        let name = node.canonical_name();

        if new_id != existing_id {
            for child in &node.child_ids {
                if let Some(c) = self.nodes.get_mut(child) {
                    c.parent_id = Some(new_id.clone());
                }
            }
            if let Some(parent_id) = &node.parent_id {
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    for child in parent.child_ids.iter_mut() {
                        if child == existing_id {
                            *child = new_id.clone();
                        }
                    }
                }
            }
        }
        if node.is_root() {
            self.root_id = new_id.clone();
            self.synthesized_root = false;
        }
        tracing::debug!(kind = %self.kind, from = %existing_id, to = %new_id, "Promoted node");
        self.names.insert(name, new_id.clone());
        self.nodes.insert(new_id.clone(), node);
        new_id
    }

    fn check_unique_id(&self, record: &RawNodeRecord) -> Result<(), BuildError> {
        if let Some(existing) = self.nodes.get(&record.id) {
            let (first_name, second_name) =
                ordered_pair(existing.hierarchical_name.clone(), record.hierarchical_name.clone());
            return Err(BuildError::DuplicateId {
                kind: self.kind,
                id: record.id.clone(),
                first_name,
                second_name,
            });
        }
        Ok(())
    }

    fn link_child(&mut self, parent_id: &str, child_id: &str) {
        let Some(child_name) = self.nodes.get(child_id).map(|n| n.hierarchical_name.clone())
        else {
            return;
        };
        let position = match self.nodes.get(parent_id) {
            Some(parent) => parent.child_ids.partition_point(|id| {
                self.nodes
                    .get(id)
                    .map(|n| n.hierarchical_name < child_name)
                    .unwrap_or(true)
            }),
            None => return,
        };
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.child_ids.insert(position, child_id.to_string());
        }
    }

    fn unlink_child(&mut self, parent_id: &str, child_id: &str) {
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.child_ids.retain(|c| c != child_id);
        }
    }
}

/// `root.x` would put a stub named `root` next to the real root
fn is_under_reserved_root(name: &str) -> bool {
    let mut segments = name.split(crate::types::NAME_SEPARATOR);
    segments.next() == Some(crate::types::ROOT_NAME) && segments.next().is_some()
}

fn ordered_pair(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn display_name(canonical: &str) -> String {
    if canonical.is_empty() {
        crate::types::ROOT_NAME.to_string()
    } else {
        canonical.to_string()
    }
}
