//! Error types for tree building, decoding, storage and the CLI surface.

use crate::types::{NodeId, NodeKind};
use std::path::PathBuf;
use thiserror::Error;

/// Tree construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("conflict: {kind} path '{name}' is defined by both '{first}' and '{second}'")]
    DuplicatePath {
        kind: NodeKind,
        name: String,
        first: NodeId,
        second: NodeId,
    },

    #[error("conflict: {kind} id '{id}' is used by both '{first_name}' and '{second_name}'")]
    DuplicateId {
        kind: NodeKind,
        id: NodeId,
        first_name: String,
        second_name: String,
    },

    #[error("{kind} path '{name}' starts with the reserved root segment")]
    ReservedName { kind: NodeKind, name: String },

    #[error("record '{id}' is a {found} but the tree holds {expected} nodes")]
    KindMismatch {
        id: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
}

/// Single-file decode errors produced by a codec
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file carries no structured header; callers treat this as non-fatal
    #[error("no structured header")]
    MissingHeader,

    #[error("malformed header: {0}")]
    Malformed(String),
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad parse in {} file(s): {}", paths.len(), display_paths(paths))]
    BadParse { paths: Vec<PathBuf> },

    #[error("illegal operation: {0}")]
    IllegalOperation(String),

    #[error(transparent)]
    Conflict(#[from] BuildError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode node {id}: {message}")]
    Encode { id: NodeId, message: String },

    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),
}

impl StorageError {
    /// Map an I/O error, keeping "file missing" recoverable
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.display().to_string())
        } else {
            StorageError::Io { path, source }
        }
    }

    /// Whether the caller may treat this as "does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    pub fn is_fatal(&self) -> bool {
        !self.is_not_found()
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// API errors surfaced by configuration, logging and CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
