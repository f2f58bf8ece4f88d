//! File codecs
//!
//! One codec per node kind converts between a single file's text and decoded
//! records. The store calls into a codec once per file per operation.

pub mod note;
pub mod schema;

pub use note::NoteCodec;
pub use schema::SchemaCodec;

use crate::error::{DecodeError, StorageError};
use crate::tree::{Node, NodeTree};
use crate::types::{NodeKind, RawNodeRecord};
use std::path::{Path, PathBuf};

/// File codec interface
pub trait NodeCodec: Send + Sync {
    fn kind(&self) -> NodeKind;

    /// File name suffix handled by this codec, including the leading dot
    fn suffix(&self) -> &'static str;

    /// Decode one file. `MissingHeader` is reported separately from
    /// `Malformed` so callers can tolerate it.
    fn decode(&self, path: &Path, text: &str) -> Result<Vec<RawNodeRecord>, DecodeError>;

    /// Records for a file that has no structured header
    fn decode_without_header(&self, path: &Path, text: &str) -> Vec<RawNodeRecord>;

    /// Serialize the file that holds `node`
    fn encode(&self, tree: &NodeTree, node: &Node) -> Result<String, StorageError>;

    /// Path of the file that holds `node`, relative to the store root
    fn relative_path(&self, tree: &NodeTree, node: &Node) -> PathBuf;

    /// Whether `path` is a file of this codec
    fn handles(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(self.suffix()) && n.len() > self.suffix().len())
            .unwrap_or(false)
    }

    /// File name with the codec suffix removed
    fn stem(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        name.strip_suffix(self.suffix())
            .map(str::to_string)
            .unwrap_or(name)
    }
}
