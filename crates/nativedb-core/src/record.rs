//! Canonical record model shared by every source adapter

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Hash assigned to records whose source never resolved one.
pub const DEFAULT_HASH: &str = "0x0000000000000000";

/// Group assigned to records whose source supplied no group label.
pub const UNKNOWN_GROUP: &str = "UNKNOWN";

/// A single declared parameter of a native.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}

impl Param {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Split one C-style `type name` piece on its last whitespace-separated token.
    ///
    /// A piece with a single token becomes a parameter with an empty type.
    pub fn parse(piece: &str) -> Option<Self> {
        let mut tokens: Vec<&str> = piece.split_whitespace().collect();
        let name = tokens.pop()?;
        Some(Self::new(tokens.join(" "), name))
    }

    /// Parse a comma-separated parameter list. Blank text yields no parameters.
    pub fn parse_list(text: &str) -> Vec<Self> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        text.split(',').filter_map(Param::parse).collect()
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ty.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.ty, self.name)
        }
    }
}

/// A fully normalized entry, ready to be indexed.
///
/// Every field is populated: absent source data has already been replaced by
/// its documented default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Primary key used for by-key lookup
    pub key: String,
    pub hash: String,
    /// Alternate hash form, empty when the source has none
    pub secondary_hash: String,
    pub comment: String,
    pub parameters: Vec<Param>,
    pub return_type: String,
    /// Group labels; the first one is the primary group
    pub groups: Vec<String>,
    /// Source-specific fields kept for detail display only
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    /// The group this record is indexed under.
    pub fn primary_group(&self) -> &str {
        self.groups
            .first()
            .map(String::as_str)
            .unwrap_or(UNKNOWN_GROUP)
    }

    /// Parameters rendered as `type name, type name`.
    pub fn params_display(&self) -> String {
        self.parameters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Call signature, e.g. `GET_PLAYER_PED(Player player)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.key, self.params_display())
    }

    /// Whether the hash was never resolved from the source.
    pub fn has_default_hash(&self) -> bool {
        self.hash == DEFAULT_HASH
    }
}

/// Catalog category labels carry a `CATEGORY_` prefix that is noise in breadcrumbs.
pub fn display_group(label: &str) -> &str {
    label.strip_prefix("CATEGORY_").unwrap_or(label)
}

/// A key as it appeared in the source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawKey {
    Text(String),
    Number(serde_json::Number),
}

/// Adapter output: a record that may still be missing fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub key: Option<RawKey>,
    pub hash: Option<String>,
    pub secondary_hash: Option<String>,
    pub comment: Option<String>,
    pub parameters: Option<Vec<Param>>,
    pub return_type: Option<String>,
    pub groups: Vec<String>,
    pub extra: BTreeMap<String, Value>,
}

impl RawRecord {
    /// Start a record belonging to a single group.
    pub fn in_group(group: impl Into<String>) -> Self {
        Self {
            groups: vec![group.into()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(key: &str, params: Vec<Param>) -> Record {
        Record {
            key: key.to_string(),
            hash: DEFAULT_HASH.to_string(),
            secondary_hash: String::new(),
            comment: String::new(),
            parameters: params,
            return_type: "void".to_string(),
            groups: vec!["PLAYER".to_string()],
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_param_parse_splits_on_last_token() {
        assert_eq!(
            Param::parse("const char* label"),
            Some(Param::new("const char*", "label"))
        );
        assert_eq!(Param::parse("  int   a "), Some(Param::new("int", "a")));
        assert_eq!(Param::parse("   "), None);
    }

    #[test]
    fn test_param_list_blank_is_empty() {
        assert!(Param::parse_list("").is_empty());
        assert!(Param::parse_list("   ").is_empty());
        assert_eq!(
            Param::parse_list("Ped ped, BOOL toggle"),
            vec![Param::new("Ped", "ped"), Param::new("BOOL", "toggle")]
        );
    }

    #[test]
    fn test_signature() {
        let record = native(
            "SET_PED_ARMOUR",
            vec![Param::new("Ped", "ped"), Param::new("int", "amount")],
        );
        assert_eq!(record.signature(), "SET_PED_ARMOUR(Ped ped, int amount)");
        assert_eq!(native("WAIT", vec![]).signature(), "WAIT()");
    }

    #[test]
    fn test_primary_group_falls_back() {
        let mut record = native("X", vec![]);
        assert_eq!(record.primary_group(), "PLAYER");
        record.groups.clear();
        assert_eq!(record.primary_group(), UNKNOWN_GROUP);
    }

    #[test]
    fn test_display_group_strips_category_prefix() {
        assert_eq!(display_group("CATEGORY_GUNS"), "GUNS");
        assert_eq!(display_group("WEAPON"), "WEAPON");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(native("X", vec![Param::new("int", "a")])).unwrap();
        assert_eq!(json["returnType"], "void");
        assert_eq!(json["secondaryHash"], "");
        assert_eq!(json["parameters"][0]["type"], "int");
    }
}
