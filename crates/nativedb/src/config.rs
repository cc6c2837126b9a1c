//! Configuration schema for nativedb
//!
//! Config lives at `.config/nativedb/config.yaml` relative to the working
//! directory. Every field is optional:
//!
//! ```yaml
//! sources:
//!   - name: natives
//!     path: dumps/natives.json
//!   - name: header
//!     path: dumps/natives.h
//!     kind: header
//! hidden_groups: [REDHOOK]
//! search_comments: true
//! ```

use facet::Facet;

/// Root configuration for nativedb
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Sources that can be loaded by name
    #[facet(default)]
    pub sources: Vec<SourceConfig>,

    /// Group labels left out of every listing
    #[facet(default)]
    pub hidden_groups: Vec<String>,

    /// Also match the filter against record comments
    #[facet(default)]
    pub search_comments: bool,

    /// Also match the filter against record hashes
    #[facet(default)]
    pub search_hashes: bool,
}

/// One named source file
#[derive(Debug, Clone, Facet)]
pub struct SourceConfig {
    /// Name used with `--source`
    pub name: String,

    /// Path to the file, relative to the working directory
    pub path: String,

    /// `map`, `array` or `header`; inferred from the file when omitted
    #[facet(default)]
    pub kind: Option<String>,
}

impl Config {
    /// Look up a configured source by name
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name.as_str())
    }
}
