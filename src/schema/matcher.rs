//! Schema path matching

use crate::schema::{SchemaModule, SchemaNode};
use crate::types::NAME_SEPARATOR;
use std::collections::BTreeMap;

/// Result of matching a note path against the schema modules
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMatch<'a> {
    pub schema: &'a SchemaNode,
    pub module_id: &'a str,
    /// Whether the final matched node absorbed the rest of the path
    pub namespace: bool,
}

/// Find the schema node governing `note_path`.
///
/// The first segment selects the module by domain. Each further segment must
/// match a child schema exactly; when none does, a namespace schema absorbs
/// the remainder and matching stops there. Exact matches always win over
/// absorption at the same level.
pub fn match_path<'a>(
    note_path: &str,
    modules: &'a BTreeMap<String, SchemaModule>,
) -> Option<SchemaMatch<'a>> {
    let mut segments = note_path.split(NAME_SEPARATOR);
    let domain = segments.next().filter(|d| !d.is_empty())?;
    let module = find_module(domain, modules)?;
    let mut current = module.root_schema()?;

    for segment in segments {
        if let Some(child) = module.children(current).find(|c| c.segment() == segment) {
            current = child;
            continue;
        }
        if current.is_namespace() {
            tracing::trace!(path = note_path, schema = current.id(), "Namespace absorbed path");
            return Some(SchemaMatch {
                schema: current,
                module_id: &module.module_id,
                namespace: true,
            });
        }
        return None;
    }

    Some(SchemaMatch {
        schema: current,
        module_id: &module.module_id,
        namespace: false,
    })
}

fn find_module<'a>(
    domain: &str,
    modules: &'a BTreeMap<String, SchemaModule>,
) -> Option<&'a SchemaModule> {
    if let Some(module) = modules.get(domain).filter(|m| m.domain() == domain) {
        return Some(module);
    }
    modules.values().find(|m| m.domain() == domain)
}
