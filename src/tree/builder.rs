//! Tree builder: flat records to a rooted tree

use crate::error::BuildError;
use crate::tree::NodeTree;
use crate::types::{canonical_name, NodeKind, RawNodeRecord};

/// Build a rooted tree of `kind` from decoded records.
///
/// Structure comes only from hierarchical names. Missing ancestors become
/// stubs, records for a stubbed path promote the stub, and two records for
/// the same path (or with the same id) fail with a conflict. The result does
/// not depend on the order of `records`.
pub fn build_tree<I>(kind: NodeKind, records: I) -> Result<NodeTree, BuildError>
where
    I: IntoIterator<Item = RawNodeRecord>,
{
    let mut tree = NodeTree::new(kind);
    let (roots, rest): (Vec<RawNodeRecord>, Vec<RawNodeRecord>) =
        records.into_iter().partition(is_root_record);

    // Root records first so the root id never depends on input order.
    for record in roots {
        tree.insert(record)?;
    }
    let mut real = 0usize;
    for record in rest {
        tree.insert(record)?;
        real += 1;
    }

    tracing::debug!(
        kind = %kind,
        records = real,
        nodes = tree.len(),
        stubs = tree.iter().filter(|n| n.is_stub).count(),
        "Built tree"
    );
    Ok(tree)
}

/// A record claims the root when its path is the reserved marker (or empty),
/// whatever literal id it carries
fn is_root_record(record: &RawNodeRecord) -> bool {
    canonical_name(&record.hierarchical_name).is_empty()
}
