//! Note files: YAML front matter followed by a markdown body.

use crate::codec::NodeCodec;
use crate::error::{DecodeError, StorageError};
use crate::tree::{Node, NodeTree};
use crate::types::{CustomData, NodeData, NodeKind, NoteData, RawNodeRecord, ROOT_NAME};
use serde_yaml::{Mapping, Value as YamlValue};
use std::path::{Path, PathBuf};

const FENCE: &str = "---";

/// Front matter keys owned by the codec; everything else is custom data
const RESERVED_KEYS: &[&str] = &[
    "id", "title", "desc", "created", "updated", "parent", "children", "stub",
];

/// Markdown note codec
#[derive(Debug, Clone, Default)]
pub struct NoteCodec {
    /// Write `parent` and `children` into the front matter
    pub write_hierarchy: bool,
}

impl NoteCodec {
    pub fn new(write_hierarchy: bool) -> Self {
        Self { write_hierarchy }
    }

    /// Serialize a node into front matter plus body
    pub fn serialize(&self, node: &Node) -> Result<String, StorageError> {
        let encode_err = |message: String| StorageError::Encode {
            id: node.id.clone(),
            message,
        };
        let data = node.data.as_note().cloned().unwrap_or_default();

        let mut header = Mapping::new();
        header.insert("id".into(), node.id.clone().into());
        header.insert("title".into(), node.title.clone().into());
        header.insert("desc".into(), data.desc.clone().unwrap_or_default().into());
        if let Some(updated) = data.updated {
            header.insert("updated".into(), updated.into());
        }
        if let Some(created) = data.created {
            header.insert("created".into(), created.into());
        }
        if self.write_hierarchy {
            let parent = match &node.parent_id {
                Some(p) => YamlValue::String(p.clone()),
                None => YamlValue::Null,
            };
            header.insert("parent".into(), parent);
            header.insert(
                "children".into(),
                YamlValue::Sequence(node.child_ids.iter().cloned().map(YamlValue::String).collect()),
            );
        }
        for (key, value) in &node.custom {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let value = serde_yaml::to_value(value).map_err(|e| encode_err(e.to_string()))?;
            header.insert(key.clone().into(), value);
        }

        let yaml = serde_yaml::to_string(&header).map_err(|e| encode_err(e.to_string()))?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n{}", data.body))
    }
}

impl NodeCodec for NoteCodec {
    fn kind(&self) -> NodeKind {
        NodeKind::Note
    }

    fn suffix(&self) -> &'static str {
        ".md"
    }

    fn decode(&self, path: &Path, text: &str) -> Result<Vec<RawNodeRecord>, DecodeError> {
        let (header, body) = split_front_matter(text)?.ok_or(DecodeError::MissingHeader)?;
        let mapping = match serde_yaml::from_str::<YamlValue>(header)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?
        {
            YamlValue::Mapping(m) => m,
            YamlValue::Null => Mapping::new(),
            other => {
                return Err(DecodeError::Malformed(format!(
                    "front matter must be a mapping, found {}",
                    yaml_type(&other)
                )))
            }
        };
        let fields: serde_json::Map<String, serde_json::Value> =
            serde_json::to_value(&mapping)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .ok_or_else(|| DecodeError::Malformed("front matter keys must be strings".into()))?;

        let stem = self.stem(path);
        let mut record = RawNodeRecord::note(
            string_field(&fields, "id").unwrap_or_else(|| stem.clone()),
            stem.clone(),
        );
        record.title = string_field(&fields, "title").unwrap_or(stem);
        record.parent_ref = string_field(&fields, "parent");
        record.child_refs = fields
            .get("children")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        record.data = NodeData::Note(NoteData {
            body: body.to_string(),
            desc: string_field(&fields, "desc").filter(|d| !d.is_empty()),
            created: millis_field(&fields, "created"),
            updated: millis_field(&fields, "updated"),
        });
        record.custom = fields
            .into_iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .collect::<CustomData>();
        Ok(vec![record])
    }

    fn decode_without_header(&self, path: &Path, text: &str) -> Vec<RawNodeRecord> {
        let stem = self.stem(path);
        let mut record = RawNodeRecord::note(stem.clone(), stem);
        record.data = NodeData::Note(NoteData {
            body: text.to_string(),
            ..Default::default()
        });
        vec![record]
    }

    fn encode(&self, _tree: &NodeTree, node: &Node) -> Result<String, StorageError> {
        self.serialize(node)
    }

    fn relative_path(&self, _tree: &NodeTree, node: &Node) -> PathBuf {
        note_relative_path(&node.hierarchical_name)
    }
}

/// Relative file path of the note with the given hierarchical name
pub fn note_relative_path(hierarchical_name: &str) -> PathBuf {
    let name = if hierarchical_name.is_empty() {
        ROOT_NAME
    } else {
        hierarchical_name
    };
    PathBuf::from(format!("{name}.md"))
}

/// Split `---` fenced front matter from the body.
///
/// `Ok(None)` when the text does not open with a fence; an opening fence
/// without a closing one is malformed.
fn split_front_matter(text: &str) -> Result<Option<(&str, &str)>, DecodeError> {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return Ok(None);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return Ok(None);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }
    Err(DecodeError::Malformed("unterminated front matter".to_string()))
}

fn string_field(fields: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn millis_field(fields: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn yaml_type(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}
