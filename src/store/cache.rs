//! Id -> path cache for note lookups

use crate::codec::NodeCodec;
use crate::tree::NodeTree;
use crate::types::NodeId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps note ids to file paths relative to the store root.
///
/// Derived from the tree and never authoritative: a miss only means the
/// caller has to go through a query.
#[derive(Debug, Clone, Default)]
pub struct IdPathCache {
    entries: HashMap<NodeId, PathBuf>,
}

impl IdPathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Path> {
        self.entries.get(id).map(PathBuf::as_path)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn insert(&mut self, id: NodeId, relative_path: PathBuf) {
        self.entries.insert(id, relative_path);
    }

    pub fn remove(&mut self, id: &str) -> Option<PathBuf> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every entry with the paths of the nodes in `tree`.
    ///
    /// Nodes read from disk keep the path they were found at; stubs get the
    /// path the codec derives from their name.
    pub fn refresh_from_tree(
        &mut self,
        tree: &NodeTree,
        codec: &dyn NodeCodec,
        located: &HashMap<NodeId, PathBuf>,
    ) {
        self.entries.clear();
        for node in tree.iter() {
            let path = located
                .get(&node.id)
                .cloned()
                .unwrap_or_else(|| codec.relative_path(tree, node));
            self.entries.insert(node.id.clone(), path);
        }
    }
}
