//! nativedb library - Browse native function and catalog dumps
//!
//! This library exposes the front end of nativedb (config loading, input
//! selection, output rendering and the browse loop) for testing and
//! embedding purposes. Ingestion and querying live in `nativedb-core`.

pub mod browse;
pub mod config;
pub mod output;

use config::Config;
use eyre::{Result, WrapErr};
use nativedb_core::{CatalogIndex, PathSources, Query, SourceKind};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where the config is looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = ".config/nativedb/config.yaml";

/// Load and parse a config file. A missing file is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file listing your sources:\n\n\
             sources:\n  \
               - name: natives\n    \
                 path: natives.json\n",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load config if it exists, otherwise return the default config.
///
/// A file that exists but cannot be read or parsed is reported and ignored.
pub fn load_config_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config at {}: {:#}", path.display(), e);
            Config::default()
        }
    }
}

/// Parse a `--kind` value or a config `kind` field
pub fn parse_kind(s: &str) -> Result<SourceKind> {
    SourceKind::parse(s).ok_or_else(|| {
        eyre::eyre!("Unknown source kind '{}' (expected map, array or header)", s)
    })
}

/// The closest candidate to `name`, if any is close enough to be a likely typo
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score > 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// The closest group label to a group the index does not have
pub fn suggest_group<'a>(index: &'a CatalogIndex, label: &str) -> Option<&'a str> {
    let upper = label.to_uppercase();
    if upper != label && index.has_group(&upper) {
        return index.group_labels().find(|g| *g == upper);
    }
    suggest(&upper, index.group_labels())
}

/// The filter a config asks for
pub fn query_for(config: &Config, text: &str) -> Query {
    Query::new(text)
        .with_comments(config.search_comments)
        .with_hashes(config.search_hashes)
        .hiding(config.hidden_groups.iter().cloned())
}

/// Which files a run loads
#[derive(Debug, Clone, Default)]
pub struct InputSelection {
    /// Explicit files; win over any configured source
    pub inputs: Vec<PathBuf>,
    /// Name of a configured source
    pub source: Option<String>,
    /// Adapter forced for every file
    pub kind: Option<SourceKind>,
}

impl InputSelection {
    /// Turn the selection into the files to load.
    ///
    /// Explicit inputs come first, then the named source, then the first
    /// configured source.
    pub fn resolve(&self, config: &Config) -> Result<PathSources> {
        if !self.inputs.is_empty() {
            return Ok(PathSources::new(self.inputs.iter().cloned()).kind(self.kind));
        }

        let source = match &self.source {
            Some(name) => config.source(name).ok_or_else(|| {
                match suggest(name, config.source_names()) {
                    Some(close) => {
                        eyre::eyre!("Unknown source '{}' (did you mean '{}'?)", name, close)
                    }
                    None => eyre::eyre!("Unknown source '{}'", name),
                }
            })?,
            None => config.sources.first().ok_or_else(|| {
                eyre::eyre!(
                    "No input given. Pass --input <file> or list sources in {}",
                    DEFAULT_CONFIG_PATH
                )
            })?,
        };

        let kind = match (self.kind, &source.kind) {
            (Some(kind), _) => Some(kind),
            (None, Some(kind)) => Some(
                parse_kind(kind)
                    .wrap_err_with(|| format!("Invalid kind for source '{}'", source.name))?,
            ),
            (None, None) => None,
        };

        Ok(PathSources::new([PathBuf::from(&source.path)]).kind(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::SourceConfig;
    use nativedb_core::{Payload, ingest};

    fn config_with(sources: &[(&str, &str, Option<&str>)]) -> Config {
        Config {
            sources: sources
                .iter()
                .map(|(name, path, kind)| SourceConfig {
                    name: name.to_string(),
                    path: path.to_string(),
                    kind: kind.map(str::to_string),
                })
                .collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_load_config_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "sources:\n  \
               - name: natives\n    path: natives.json\n  \
               - name: header\n    path: natives.h\n    kind: header\n\
             hidden_groups:\n  - REDHOOK\n\
             search_comments: true\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].kind, None);
        assert_eq!(config.source("header").unwrap().kind.as_deref(), Some("header"));
        assert_eq!(config.hidden_groups, vec!["REDHOOK"]);
        assert!(config.search_comments);
        assert!(!config.search_hashes);
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        assert!(load_config(&path).is_err());
        assert!(load_config_or_default(&path).sources.is_empty());
    }

    #[test]
    fn test_broken_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sources: [[[").unwrap();
        assert!(load_config(&path).is_err());
        assert!(load_config_or_default(&path).sources.is_empty());
    }

    #[test]
    fn test_resolve_prefers_explicit_inputs() {
        let config = config_with(&[("natives", "natives.json", None)]);
        let selection = InputSelection {
            inputs: vec![PathBuf::from("a.h"), PathBuf::from("b.json")],
            ..InputSelection::default()
        };
        let sources = selection.resolve(&config).unwrap();
        assert_eq!(sources.paths(), &[PathBuf::from("a.h"), PathBuf::from("b.json")]);
    }

    #[test]
    fn test_resolve_named_and_first_source() {
        let config = config_with(&[
            ("natives", "natives.json", None),
            ("header", "natives.h", Some("header")),
        ]);

        let first = InputSelection::default().resolve(&config).unwrap();
        assert_eq!(first.paths(), &[PathBuf::from("natives.json")]);

        let named = InputSelection {
            source: Some("header".to_string()),
            ..InputSelection::default()
        };
        assert_eq!(named.resolve(&config).unwrap().paths(), &[PathBuf::from("natives.h")]);
    }

    #[test]
    fn test_resolve_errors() {
        let config = config_with(&[("natives", "natives.json", Some("xml"))]);

        let err = InputSelection {
            source: Some("nativs".to_string()),
            ..InputSelection::default()
        }
        .resolve(&config)
        .unwrap_err();
        assert!(err.to_string().contains("did you mean 'natives'"), "{}", err);

        assert!(InputSelection::default().resolve(&config).is_err());
        assert!(InputSelection::default().resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_query_for_applies_config() {
        let config = Config {
            hidden_groups: vec!["REDHOOK".to_string()],
            search_comments: true,
            ..Config::default()
        };
        let query = query_for(&config, "Ped");
        assert_eq!(query.text(), "ped");
        assert!(query.is_hidden("REDHOOK"));
    }

    #[test]
    fn test_suggest_group() {
        let payload = Payload::parse(
            SourceKind::Map,
            r#"{"PLAYER": {"0x1": {"name": "A"}}, "WEAPON": {"0x2": {"name": "B"}}}"#,
        )
        .unwrap();
        let index = ingest(SourceKind::Map, &payload).unwrap();
        assert_eq!(suggest_group(&index, "player"), Some("PLAYER"));
        assert_eq!(suggest_group(&index, "WEAPN"), Some("WEAPON"));
        assert_eq!(suggest_group(&index, "ZZZ"), None);
    }
}
