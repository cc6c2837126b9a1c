//! Nested `group -> hash -> fields` JSON dumps (alloc8or-style natives.json)

use super::{Adapter, Extraction};
use crate::error::{IngestError, IngestResult};
use crate::payload::{Payload, SourceKind, json_type_name};
use crate::record::{Param, RawKey, RawRecord};
use serde_json::{Map, Value};
use tracing::debug;

const NAME_FIELDS: &[&str] = &["name", "NativeName", "hashName"];
const HASH_FIELDS: &[&str] = &["hash", "Hash", "native"];
const SECONDARY_HASH_FIELDS: &[&str] = &["jhash"];
const COMMENT_FIELDS: &[&str] = &["comment", "desc", "description"];
const PARAM_FIELDS: &[&str] = &["params", "Params", "arguments", "args"];
const RETURN_FIELDS: &[&str] = &["returns", "return", "return_type"];

/// Adapter for [`SourceKind::Map`] payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapAdapter;

impl Adapter for MapAdapter {
    const KIND: SourceKind = SourceKind::Map;

    fn extract(&self, payload: &Payload) -> IngestResult<Extraction> {
        let value = payload.expect_json(Self::KIND, "an object")?;
        let Value::Object(groups) = value else {
            return Err(IngestError::Mismatch {
                kind: Self::KIND,
                expected: "an object",
                found: json_type_name(value),
            });
        };

        let mut out = Extraction::new();
        for (group, entries) in groups {
            let Value::Object(entries) = entries else {
                debug!(group = %group, "skipping group whose value is not an object");
                out.skipped += 1;
                continue;
            };
            out.declare(group);

            for (hash, fields) in entries {
                let Value::Object(fields) = fields else {
                    debug!(
                        group = %group,
                        hash = %hash,
                        "skipping entry whose value is not an object"
                    );
                    out.skipped += 1;
                    continue;
                };
                out.records.push(map_entry(group, hash, fields));
            }
        }
        Ok(out)
    }
}

fn map_entry(group: &str, hash_key: &str, fields: &Map<String, Value>) -> RawRecord {
    let mut record = RawRecord::in_group(group);

    let name = first_present(fields, NAME_FIELDS).and_then(as_text);
    let hash = first_present(fields, HASH_FIELDS).and_then(as_text);
    record.secondary_hash = first_present(fields, SECONDARY_HASH_FIELDS).and_then(as_text);
    record.comment = first_present(fields, COMMENT_FIELDS).and_then(as_text);
    record.parameters = first_present(fields, PARAM_FIELDS).map(params_from_value);
    record.return_type = first_present(fields, RETURN_FIELDS).and_then(as_text);

    // The inner key stands in for the hash only when the entry carries none.
    let hash = hash.unwrap_or_else(|| hash_key.to_string());
    record.key = Some(RawKey::Text(name.unwrap_or_else(|| hash.clone())));
    record.hash = Some(hash);

    record.extra = fields
        .iter()
        .filter(|(name, _)| !is_alias(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    record
}

fn first_present<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| fields.get(*alias).filter(|v| is_present(v)))
}

fn is_alias(name: &str) -> bool {
    [
        NAME_FIELDS,
        HASH_FIELDS,
        SECONDARY_HASH_FIELDS,
        COMMENT_FIELDS,
        PARAM_FIELDS,
        RETURN_FIELDS,
    ]
    .iter()
    .any(|aliases| aliases.contains(&name))
}

/// Aliases resolve like a chain of `||`: empty strings and nulls fall through.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parameters arrive either as `[{"type": .., "name": ..}]` or as raw C text.
fn params_from_value(value: &Value) -> Vec<Param> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(param) => Some(Param::new(
                    param.get("type").and_then(as_text).unwrap_or_default(),
                    param.get("name").and_then(as_text).unwrap_or_default(),
                )),
                Value::String(piece) => Param::parse(piece),
                _ => None,
            })
            .collect(),
        Value::String(text) => Param::parse_list(text),
        _ => Vec::new(),
    }
}
