//! Flat catalogs: `[{"key": .., "category": [..], "price": ..}]`, either bare
//! or wrapped as `{"version": .., "numberItems": .., "items": [..]}`

use super::{Adapter, Extraction};
use crate::error::{IngestError, IngestResult};
use crate::payload::{Payload, SourceKind, json_type_name};
use crate::record::{RawKey, RawRecord};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

const EXPECTED: &str = "an array or an object with an `items` array";

/// Header fields of a wrapped catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInfo {
    /// Catalog version as written by the source
    pub version: Option<String>,
    /// Item count the source claims, which may differ from what was ingested
    pub number_items: Option<u64>,
}

impl CatalogInfo {
    fn from_envelope(fields: &Map<String, Value>) -> Self {
        let version = match fields.get("version") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let number_items = match fields.get("numberItems") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Self {
            version,
            number_items,
        }
    }
}

impl std::fmt::Display for CatalogInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "v{}", version)?,
            None => f.write_str("v?")?,
        }
        match self.number_items {
            Some(n) => write!(f, " / {} items", n),
            None => f.write_str(" / ? items"),
        }
    }
}

/// Adapter for [`SourceKind::Array`] payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayAdapter;

impl Adapter for ArrayAdapter {
    const KIND: SourceKind = SourceKind::Array;

    fn extract(&self, payload: &Payload) -> IngestResult<Extraction> {
        let value = payload.expect_json(Self::KIND, EXPECTED)?;
        let mismatch = || IngestError::Mismatch {
            kind: Self::KIND,
            expected: EXPECTED,
            found: json_type_name(value),
        };
        let (items, catalog) = match value {
            Value::Array(items) => (items, None),
            Value::Object(envelope) => match envelope.get("items") {
                Some(Value::Array(items)) => (items, Some(CatalogInfo::from_envelope(envelope))),
                _ => return Err(mismatch()),
            },
            _ => return Err(mismatch()),
        };

        let mut out = Extraction::new();
        for (index, item) in items.iter().enumerate() {
            let Value::Object(fields) = item else {
                debug!(index, "skipping catalog item that is not an object");
                out.skipped += 1;
                continue;
            };
            out.records.push(catalog_item(fields));
        }
        if let Some(info) = &catalog
            && info.number_items.is_some_and(|n| n != items.len() as u64)
        {
            debug!(%info, found = items.len(), "catalog item count differs from its header");
        }
        out.catalog = catalog;
        Ok(out)
    }
}

fn catalog_item(fields: &Map<String, Value>) -> RawRecord {
    let mut record = RawRecord::default();
    for (name, value) in fields {
        match (name.as_str(), value) {
            ("key", Value::String(s)) => record.key = Some(RawKey::Text(s.clone())),
            ("key", Value::Number(n)) => record.key = Some(RawKey::Number(n.clone())),
            ("category", Value::Array(labels)) => {
                record.groups = labels
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ("category", Value::String(label)) if !label.is_empty() => {
                record.groups = vec![label.clone()];
            }
            ("hash", Value::String(s)) => record.hash = Some(s.clone()),
            ("comment" | "description", Value::String(s)) if record.comment.is_none() => {
                record.comment = Some(s.clone())
            }
            _ => {
                record.extra.insert(name.clone(), value.clone());
            }
        }
    }
    record
}
