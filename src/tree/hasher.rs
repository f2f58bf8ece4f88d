//! Deterministic identifiers for synthesized nodes

use crate::types::{canonical_name, NodeId, NodeKind};

const STUB_ID_BYTES: usize = 10;

/// Compute the id of a stub node
///
/// The id depends only on the node kind and the dotted prefix, so the same
/// set of records always yields the same stub ids regardless of input order.
pub fn stub_id(kind: NodeKind, hierarchical_name: &str) -> NodeId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(&[0u8]);
    hasher.update(canonical_name(hierarchical_name).as_bytes());
    let hash = hasher.finalize();
    format!("stub-{}", hex::encode(&hash.as_bytes()[..STUB_ID_BYTES]))
}
