//! Line-oriented parser for C-style native headers
//!
//! The header format encodes what the JSON dumps store as fields in the
//! surrounding source instead:
//!
//! ```text
//! namespace WEAPON
//! static void _0x1234(int a)
//! {
//! Invoke<0xABCD1234>(...)
//! }
//! }
//! ```
//!
//! - group membership comes from the enclosing `namespace` line
//! - the hash comes from the `Invoke<0x...>` call in the next two lines, and
//!   is only looked for when both of those lines exist
//! - declarations named `_0x...` are anonymous and are keyed by their hash
//!
//! A bare `}` line always closes the namespace. Namespaces are never nested in
//! the dumps this targets, and a function body closed by its own `}` line ends
//! the namespace as well. Declarations found while outside a namespace are
//! dropped.

use super::{Adapter, Extraction};
use crate::error::{IngestError, IngestResult};
use crate::payload::{Payload, SourceKind};
use crate::record::{DEFAULT_HASH, Param, RawKey, RawRecord};
use tracing::debug;

/// How many lines after a declaration are searched for its `Invoke<>` call
pub const LOOKAHEAD_LINES: usize = 2;

/// Lexical position of the scanner relative to `namespace` blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Not inside any namespace; declarations here are dropped
    #[default]
    Outside,
    /// Inside `namespace <name>`
    Inside(String),
}

impl Scope {
    /// The group declarations are currently attributed to, if any
    pub fn group(&self) -> Option<&str> {
        match self {
            Scope::Outside => None,
            Scope::Inside(name) => Some(name),
        }
    }

    fn enter(&mut self, name: &str) {
        *self = Scope::Inside(name.to_string());
    }

    fn close(&mut self) {
        *self = Scope::Outside;
    }
}

/// A `static <returns> <name>(<params>)` line, borrowed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub return_type: &'a str,
    pub name: &'a str,
    pub params: &'a str,
}

impl Declaration<'_> {
    /// Whether the declared name is a placeholder for an unnamed native
    pub fn is_anonymous(&self) -> bool {
        self.name.starts_with("_0x")
    }

    fn into_record(self, group: &str, hash: Option<String>) -> RawRecord {
        let hash = hash.unwrap_or_else(|| DEFAULT_HASH.to_string());
        let key = if self.is_anonymous() {
            hash.clone()
        } else {
            self.name.to_string()
        };

        let mut record = RawRecord::in_group(group);
        record.key = Some(RawKey::Text(key));
        record.hash = Some(hash);
        record.parameters = Some(Param::parse_list(self.params));
        record.return_type = Some(self.return_type.to_string());
        record
    }
}

/// Adapter for [`SourceKind::HeaderText`] payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderTextAdapter;

impl Adapter for HeaderTextAdapter {
    const KIND: SourceKind = SourceKind::HeaderText;

    fn extract(&self, payload: &Payload) -> IngestResult<Extraction> {
        let Payload::Text(text) = payload else {
            return Err(IngestError::Mismatch {
                kind: Self::KIND,
                expected: "text",
                found: payload.describe(),
            });
        };
        Ok(extract_header(text))
    }
}

fn extract_header(text: &str) -> Extraction {
    // A trailing newline leaves an empty last line, which still counts
    // towards a full lookahead window.
    let lines: Vec<&str> = text.split('\n').collect();
    let mut scope = Scope::Outside;
    let mut out = Extraction::new();

    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.trim();

        if let Some(name) = namespace_name(line) {
            scope.enter(name);
            out.declare(name);
            continue;
        }

        if line == "}" {
            scope.close();
            continue;
        }

        let Some(decl) = parse_declaration(line) else {
            continue;
        };

        let hash = lines
            .get(idx + 1..=idx + LOOKAHEAD_LINES)
            .and_then(find_invoke_hash);

        match scope.group() {
            Some(group) => out.records.push(decl.into_record(group, hash)),
            None => {
                debug!(
                    line = idx + 1,
                    name = decl.name,
                    "dropping declaration outside any namespace"
                );
                out.skipped += 1;
            }
        }
    }

    out
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_return_type_char(c: char) -> bool {
    is_word(c) || c.is_whitespace() || matches!(c, '*' | '&' | '<' | '>' | ':')
}

/// `namespace <ident>` at the start of a trimmed line
fn namespace_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("namespace")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let end = rest.find(|c: char| !is_word(c)).unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Recognise `static <returns> <name>(<params>)` on a trimmed line.
///
/// The return type may span several tokens (`const char*`); the name is the
/// last identifier before the opening parenthesis and must be separated from
/// the return type by whitespace. The parameter text runs up to the first `)`.
pub fn parse_declaration(line: &str) -> Option<Declaration<'_>> {
    let rest = line.trim_start().strip_prefix("static")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let open = rest.find('(')?;
    let close = open + 1 + rest[open + 1..].find(')')?;
    let head = rest[..open].trim_end();

    let name_start = head
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word(c))
        .last()
        .map(|(i, _)| i)?;
    let name = &head[name_start..];

    let before = &head[..name_start];
    if !before.ends_with(char::is_whitespace) {
        return None;
    }
    let return_type = before.trim();
    if return_type.is_empty() || !return_type.chars().all(is_return_type_char) {
        return None;
    }

    Some(Declaration {
        return_type,
        name,
        params: &rest[open + 1..close],
    })
}

/// Find the `Invoke<0x...>` hash in the lines following a declaration.
///
/// Only the first line of the window that mentions `Invoke<` is inspected.
/// The hex literal is matched case-insensitively, capped at 16 digits, and
/// returned as written.
pub fn find_invoke_hash(window: &[&str]) -> Option<String> {
    let line = window.iter().map(|l| l.trim()).find(|l| l.contains("Invoke<"))?;

    let lower = line.to_ascii_lowercase();
    lower
        .match_indices("invoke")
        .find_map(|(start, _)| hex_after_invoke(line, start + "invoke".len()))
}

fn hex_after_invoke(line: &str, mut pos: usize) -> Option<String> {
    let bytes = line.as_bytes();
    let skip_ws = |mut p: usize| {
        while p < bytes.len() && bytes[p].is_ascii_whitespace() {
            p += 1;
        }
        p
    };

    pos = skip_ws(pos);
    if bytes.get(pos) != Some(&b'<') {
        return None;
    }
    pos = skip_ws(pos + 1);

    let start = pos;
    if bytes.get(pos) != Some(&b'0') || !matches!(bytes.get(pos + 1), Some(b'x' | b'X')) {
        return None;
    }
    pos += 2;

    let digits = bytes[pos..]
        .iter()
        .take(16)
        .take_while(|b| b.is_ascii_hexdigit())
        .count();
    if digits == 0 {
        return None;
    }
    Some(line[start..pos + digits].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Extraction {
        HeaderTextAdapter.extract(&Payload::from(text)).unwrap()
    }

    #[test]
    fn test_anonymous_native_in_namespace() {
        let text = "namespace WEAPON\n\
                    static void _0x1234(int a)\n\
                    {\n\
                    Invoke<0xABCD1234>(...)\n\
                    }\n\
                    }\n\
                    static void OUTSIDE(int b)\n";
        let out = run(text);
        assert_eq!(out.len(), 1);
        let record = &out.records[0];
        assert_eq!(record.groups, vec!["WEAPON".to_string()]);
        assert_eq!(record.key, Some(RawKey::Text("0xABCD1234".to_string())));
        assert_eq!(record.hash.as_deref(), Some("0xABCD1234"));
        assert_eq!(record.parameters, Some(vec![Param::new("int", "a")]));
        assert_eq!(record.return_type.as_deref(), Some("void"));
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn test_named_native_keeps_name() {
        let text = "namespace PLAYER {\n\
                    static Ped GET_PLAYER_PED(Player player) \
                    { return Invoke<0x275F255ED201B937, Ped>(player); }\n\
                    static BOOL IS_PLAYER_DEAD(Player player)\n\
                    { return Invoke<0x2E9C3F0B, BOOL>(player); }\n";
        let out = run(text);
        assert_eq!(out.len(), 2);
        // the hash is only looked for on the following lines
        assert_eq!(out.records[0].key, Some(RawKey::Text("GET_PLAYER_PED".to_string())));
        assert_eq!(out.records[0].hash.as_deref(), Some("0x2E9C3F0B"));
        assert_eq!(out.records[1].hash.as_deref(), Some("0x2E9C3F0B"));
    }

    #[test]
    fn test_hash_beyond_window_is_unresolved() {
        let text = "namespace A\n\
                    static void _0xDEAD()\n\
                    {\n\
                    // body\n\
                    Invoke<0xDEAD>();\n";
        let out = run(text);
        assert_eq!(out.records[0].hash.as_deref(), Some(DEFAULT_HASH));
        assert_eq!(out.records[0].key, Some(RawKey::Text(DEFAULT_HASH.to_string())));
    }

    #[test]
    fn test_short_window_at_end_of_text_keeps_default_hash() {
        // only one line follows the declaration
        let out = run("namespace A\nstatic int F()\nInvoke<0x42>();");
        assert_eq!(out.records[0].hash.as_deref(), Some(DEFAULT_HASH));

        // the trailing newline completes the window
        let out = run("namespace A\nstatic int F()\nInvoke<0x42>();\n");
        assert_eq!(out.records[0].hash.as_deref(), Some("0x42"));

        let out = run("namespace A\nstatic int F()");
        assert_eq!(out.records[0].hash.as_deref(), Some(DEFAULT_HASH));
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let out = run("namespace A\r\nstatic int F()\r\n{\r\nInvoke<0x42>();\r\n}\r\n");
        assert_eq!(out.records[0].hash.as_deref(), Some("0x42"));
        assert_eq!(out.declared_groups, vec!["A"]);
    }

    #[test]
    fn test_empty_params_and_trimmed_return_type() {
        let decl = parse_declaration("static   const char*   GET_LABEL(  )").unwrap();
        assert_eq!(decl.return_type, "const char*");
        assert_eq!(decl.name, "GET_LABEL");
        assert!(Param::parse_list(decl.params).is_empty());
    }

    #[test]
    fn test_parse_declaration_rejects_non_declarations() {
        assert!(parse_declaration("void F(int a)").is_none());
        assert!(parse_declaration("static_assert(x)").is_none());
        assert!(parse_declaration("static Any *F(int a)").is_none());
        assert!(parse_declaration("static F(int a)").is_none());
        assert!(parse_declaration("static int F(int a").is_none());
    }

    #[test]
    fn test_parse_declaration_with_space_before_paren() {
        let decl = parse_declaration("static Vector3 GET_COORDS (Entity e, BOOL alive)").unwrap();
        assert_eq!(decl.name, "GET_COORDS");
        assert_eq!(
            Param::parse_list(decl.params),
            vec![Param::new("Entity", "e"), Param::new("BOOL", "alive")]
        );
    }

    #[test]
    fn test_find_invoke_hash_variants() {
        assert_eq!(find_invoke_hash(&["Invoke<0xabc>()"]), Some("0xabc".to_string()));
        assert_eq!(
            find_invoke_hash(&["{", "  return Invoke<0X1F, int>(a);"]),
            Some("0X1F".to_string())
        );
        assert_eq!(
            find_invoke_hash(&["Invoke<0x0123456789ABCDEF01>()"]),
            Some("0x0123456789ABCDEF".to_string())
        );
        assert_eq!(find_invoke_hash(&["Invoke<int>()"]), None);
        assert_eq!(find_invoke_hash(&["Invoke <0x1>()"]), None);
        assert_eq!(find_invoke_hash(&[]), None);
    }

    #[test]
    fn test_first_invoke_line_wins() {
        let hash = find_invoke_hash(&["Invoke<T>(x)", "Invoke<0x99>()"]);
        assert_eq!(hash, None);
    }

    #[test]
    fn test_namespace_switches_and_declares() {
        let text = "namespace A\nstatic void F()\n}\nnamespace B\nnamespace C\nstatic void G()\n";
        let out = run(text);
        assert_eq!(out.declared_groups, vec!["A", "B", "C"]);
        let groups: Vec<_> = out.records.iter().map(|r| r.groups[0].as_str()).collect();
        assert_eq!(groups, vec!["A", "C"]);
    }

    #[test]
    fn test_scope_transitions() {
        let mut scope = Scope::default();
        assert_eq!(scope.group(), None);
        scope.enter("PED");
        assert_eq!(scope.group(), Some("PED"));
        scope.close();
        assert_eq!(scope, Scope::Outside);
    }

    #[test]
    fn test_namespace_name() {
        assert_eq!(namespace_name("namespace WEAPON"), Some("WEAPON"));
        assert_eq!(namespace_name("namespace PED {"), Some("PED"));
        assert_eq!(namespace_name("namespaceX"), None);
        assert_eq!(namespace_name("namespace {"), None);
    }

    #[test]
    fn test_json_payload_is_fatal() {
        let err = HeaderTextAdapter
            .extract(&Payload::Json(serde_json::json!({})))
            .unwrap_err();
        assert_eq!(err.to_string(), "header source expects text, got an object");
    }

    #[test]
    fn test_empty_text() {
        let out = run("");
        assert!(out.is_empty());
        assert!(out.declared_groups.is_empty());
    }
}
