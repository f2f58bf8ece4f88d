//! Node Store
//!
//! Persistence boundary for note and schema trees. The store reads every file
//! of a kind into a [`NodeTree`], serves single reads by id, and writes or
//! deletes individual nodes while keeping an id -> path cache in step.

pub mod cache;
pub mod listing;
pub mod persistence;

pub use cache::IdPathCache;
pub use persistence::FileStore;

use crate::error::StorageError;
use crate::tree::NodeTree;
use crate::types::{NodeId, NodeKind, RawNodeRecord};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

/// The only query string the store understands: every node of a kind
pub const QUERY_ALL: &str = "**/*";

/// Write behaviour for a single call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Persist the node even when it is a stub
    pub write_as_stub: bool,
    /// Also write every descendant with the same options
    pub recursive: bool,
    /// Persist stubs and recurse into descendants
    pub force_persist_stub: bool,
}

impl WriteOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Default::default()
        }
    }

    /// Whether a node with the given stub flag is written to disk
    pub fn persists(&self, is_stub: bool) -> bool {
        self.force_persist_stub || self.write_as_stub || !is_stub
    }

    /// Whether the write descends into children
    pub fn descends(&self) -> bool {
        self.recursive || self.force_persist_stub
    }
}

/// Delete behaviour for a single call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// File to remove instead of the cached path; relative paths resolve
    /// against the store root
    pub explicit_path: Option<PathBuf>,
}

/// Outcome of a write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Files written, relative to the store root, sorted
    pub written: Vec<PathBuf>,
    /// Visited nodes that were not persisted (stubs)
    pub skipped: Vec<NodeId>,
}

/// Node store interface
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Read the note with the given id
    async fn get(&self, id: &str) -> Result<RawNodeRecord, StorageError>;

    /// Run a query; only [`QUERY_ALL`] is supported
    async fn query(&self, query: &str, kind: NodeKind) -> Result<NodeTree, StorageError> {
        if query != QUERY_ALL {
            return Err(StorageError::UnsupportedQuery(query.to_string()));
        }
        self.query_all(kind).await
    }

    /// Read every node of a kind and build its tree
    async fn query_all(&self, kind: NodeKind) -> Result<NodeTree, StorageError>;

    /// Write the node `id` of `tree`
    async fn write(
        &self,
        tree: &NodeTree,
        id: &str,
        options: WriteOptions,
    ) -> Result<WriteSummary, StorageError>;

    /// Delete a single note file. Never cascades to children.
    async fn delete(&self, id: &str, options: DeleteOptions) -> Result<(), StorageError>;
}
