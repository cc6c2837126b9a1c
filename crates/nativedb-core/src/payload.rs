//! Source kinds and the raw payloads they accept

use crate::error::{IngestError, IngestResult};
use serde_json::Value;
use std::path::Path;

/// Which adapter a payload is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `{ "<group>": { "<hash>": { ...fields } } }`
    Map,
    /// `[ { "key": ..., "category": [...] } ]`
    Array,
    /// C-style header with `namespace` blocks and `Invoke<0x...>` bodies
    HeaderText,
}

impl SourceKind {
    /// Parse a kind from its configuration name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "map" => Some(SourceKind::Map),
            "array" => Some(SourceKind::Array),
            "header" | "h" => Some(SourceKind::HeaderText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Map => "map",
            SourceKind::Array => "array",
            SourceKind::HeaderText => "header",
        }
    }

    /// Kind implied by a file extension alone
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("h" | "hpp") => Some(SourceKind::HeaderText),
            _ => None,
        }
    }

    /// Kind implied by the shape of a parsed JSON document.
    ///
    /// Catalogs come either as a bare array or wrapped in an object whose
    /// `items` field holds that array; any other object is a map dump.
    pub fn of_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(_) => Some(SourceKind::Array),
            Value::Object(fields) if fields.get("items").is_some_and(Value::is_array) => {
                Some(SourceKind::Array)
            }
            Value::Object(_) => Some(SourceKind::Map),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An already-retrieved source document.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// Turn raw file contents into the payload shape `kind` expects.
    pub fn parse(kind: SourceKind, raw: &str) -> IngestResult<Self> {
        match kind {
            SourceKind::Map | SourceKind::Array => Ok(Payload::Json(serde_json::from_str(raw)?)),
            SourceKind::HeaderText => Ok(Payload::Text(raw.to_string())),
        }
    }

    /// Parse raw contents when no kind was given.
    ///
    /// Header extensions win; otherwise contents that look like JSON are
    /// parsed and their shape picks the kind. `Ok(None)` when neither decides.
    pub fn sniff(path: &Path, raw: &str) -> IngestResult<Option<(SourceKind, Self)>> {
        if let Some(kind) = SourceKind::from_extension(path) {
            return Ok(Some((kind, Payload::parse(kind, raw)?)));
        }
        if !matches!(raw.trim_start().as_bytes().first(), Some(b'{' | b'[')) {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(raw)?;
        Ok(SourceKind::of_json(&value).map(|kind| (kind, Payload::Json(value))))
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Payload::Json(value) => json_type_name(value),
            Payload::Text(_) => "text",
        }
    }

    pub(crate) fn expect_json(
        &self,
        kind: SourceKind,
        expected: &'static str,
    ) -> IngestResult<&Value> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Text(_) => Err(IngestError::Mismatch {
                kind,
                expected,
                found: self.describe(),
            }),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
