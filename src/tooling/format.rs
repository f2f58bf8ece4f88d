//! Format notes, trees and schema matches as text or JSON.

use crate::error::ApiError;
use crate::schema::SchemaMatch;
use crate::tree::NodeTree;
use crate::types::{NodeId, RawNodeRecord, SchemaAssignment};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Output format for commands that support JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self, ApiError> {
        match format {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::InvalidArgument(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

/// One row of `list`
#[derive(Debug, Clone, Serialize)]
pub struct NoteRow {
    pub id: NodeId,
    pub name: String,
    pub stub: bool,
    pub schema: Option<String>,
}

/// Result of `match`
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutput {
    pub path: String,
    pub module_id: Option<String>,
    pub schema_id: Option<String>,
    pub namespace: bool,
}

impl MatchOutput {
    pub fn new(path: &str, found: Option<&SchemaMatch<'_>>) -> Self {
        Self {
            path: path.to_string(),
            module_id: found.map(|m| m.module_id.to_string()),
            schema_id: found.map(|m| m.schema.id().to_string()),
            namespace: found.map(|m| m.namespace).unwrap_or(false),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to serialize output: {}", e)))
}

/// Rows for every note in hierarchical order
pub fn note_rows(
    tree: &NodeTree,
    assignments: &BTreeMap<NodeId, SchemaAssignment>,
) -> Vec<NoteRow> {
    tree.descendants(tree.root_id())
        .into_iter()
        .map(|node| NoteRow {
            id: node.id.clone(),
            name: node.hierarchical_name.clone(),
            stub: node.is_stub,
            schema: assignments
                .get(&node.id)
                .map(|a| format!("{}/{}", a.module_id, a.schema_id)),
        })
        .collect()
}

/// Indented note tree; stubs are dimmed
pub fn format_note_tree(tree: &NodeTree) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree.root_id().to_string(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(&id) else {
            continue;
        };
        let label = if node.is_root() {
            node.hierarchical_name.clone()
        } else {
            node.segment().to_string()
        };
        let indent = "  ".repeat(depth);
        if node.is_stub {
            out.push_str(&format!("{}{} {}\n", indent, label.dimmed(), "(stub)".dimmed()));
        } else {
            out.push_str(&format!("{}{}\n", indent, label.bold()));
        }
        for child in node.child_ids.iter().rev() {
            stack.push((child.clone(), depth + 1));
        }
    }
    out
}

pub fn format_note_list(rows: &[NoteRow], format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(&rows);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Stub", "Schema"]);
    for row in rows {
        table.add_row(vec![
            row.id.clone(),
            row.name.clone(),
            if row.stub { "yes" } else { "no" }.to_string(),
            row.schema.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    Ok(table.to_string())
}

pub fn format_match(output: &MatchOutput, format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(output);
    }
    match (&output.module_id, &output.schema_id) {
        (Some(module), Some(schema)) => {
            let mut line = format!("{} -> {}/{}", output.path, module, schema.bold());
            if output.namespace {
                line.push_str(" (namespace)");
            }
            Ok(line)
        }
        _ => Ok(format!("{}: no schema matches", output.path)),
    }
}

/// Note header fields followed by the body
pub fn format_note(record: &RawNodeRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", record.title.bold().underline()));
    out.push_str(&format!("  Id: {}\n", record.id));
    out.push_str(&format!("  Name: {}\n", record.hierarchical_name));
    if let Some(note) = record.data.as_note() {
        if let Some(desc) = &note.desc {
            out.push_str(&format!("  Desc: {}\n", desc));
        }
        let updated = note
            .updated
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis);
        if let Some(updated) = updated {
            out.push_str(&format!("  Updated: {}\n", updated.to_rfc3339()));
        }
        for (key, value) in &record.custom {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
        out.push('\n');
        out.push_str(&note.body);
    }
    out
}
