//! Notetree: Hierarchical Note and Schema Store
//!
//! Notes and schemas are named with dot-delimited hierarchical names
//! (`foo.bar.baz`) and stored one per file. The crate rebuilds a consistent
//! tree from the flat set of files, synthesizing stub nodes for implied
//! ancestors, matches note paths against schema modules, and keeps the files
//! and an id -> path cache in step on writes and deletes.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod schema;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use engine::Engine;
pub use error::{ApiError, BuildError, DecodeError, StorageError};
pub use schema::{match_path, SchemaMatch, SchemaModule};
pub use store::{DeleteOptions, FileStore, NodeStore, WriteOptions, WriteSummary};
pub use tree::{build_tree, Node, NodeTree};
pub use types::{NodeData, NodeId, NodeKind, RawNodeRecord, SchemaAssignment};
