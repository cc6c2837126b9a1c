//! Field defaulting and key formatting applied after every adapter

use crate::record::{DEFAULT_HASH, RawKey, RawRecord, Record, UNKNOWN_GROUP};
use serde_json::Number;

/// Turn an adapter record into a fully populated [`Record`].
///
/// - numeric keys are rendered as `0x` + uppercase hex
/// - a missing or empty key falls back to the hash
/// - a missing hash becomes [`DEFAULT_HASH`]
/// - a record without groups lands in [`UNKNOWN_GROUP`]
///
/// No deduplication happens here.
pub fn normalize(raw: RawRecord) -> Record {
    let hash = raw
        .hash
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HASH.to_string());

    let key = raw
        .key
        .as_ref()
        .map(format_key)
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| hash.clone());

    let mut groups: Vec<String> = raw.groups.into_iter().filter(|g| !g.is_empty()).collect();
    if groups.is_empty() {
        groups.push(UNKNOWN_GROUP.to_string());
    }

    Record {
        key,
        hash,
        secondary_hash: raw.secondary_hash.unwrap_or_default(),
        comment: raw.comment.unwrap_or_default(),
        parameters: raw.parameters.unwrap_or_default(),
        return_type: raw
            .return_type
            .map(|r| r.trim().to_string())
            .unwrap_or_default(),
        groups,
        extra: raw.extra,
    }
}

/// Render a source key as a lookup key.
pub fn format_key(key: &RawKey) -> String {
    match key {
        RawKey::Text(text) => text.clone(),
        RawKey::Number(number) => hex_key(number),
    }
}

fn hex_key(number: &Number) -> String {
    if let Some(n) = number.as_u64() {
        return format!("0x{n:X}");
    }
    if let Some(n) = number.as_i64() {
        return format!("0x-{:X}", n.unsigned_abs());
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < u64::MAX as f64 => {
            let sign = if f < 0.0 { "-" } else { "" };
            format!("0x{sign}{:X}", f.abs() as u64)
        }
        // Fractional keys have no sensible hex form; keep their decimal text.
        _ => number.to_string(),
    }
}
