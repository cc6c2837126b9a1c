//! The loaded catalog for one browsing session
//!
//! A [`Session`] owns the current index. Every load runs the whole pipeline
//! (adapter, normalizer, index builder) to completion before the result is
//! swapped in, so queries only ever see a complete index: either the previous
//! one or the new one. A failed load leaves the session exactly as it was.

use crate::adapters::CatalogInfo;
use crate::error::IngestResult;
use crate::index::CatalogIndex;
use crate::sources::Sources;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Statistics for one completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStats {
    /// Session version the load produced
    pub version: u64,
    pub records: usize,
    pub groups: usize,
    /// Distinct keys; lower than `records` when keys repeat
    pub keys: usize,
    /// Source units dropped by the adapters
    pub skipped: usize,
    pub elapsed: Duration,
    /// Header of a wrapped catalog source
    pub catalog: Option<CatalogInfo>,
}

/// Explicitly owned holder of the current [`CatalogIndex`].
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Arc<CatalogIndex>>,
    version: u64,
    last_load: Option<LoadStats>,
}

impl Session {
    /// A session with nothing loaded yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a full ingest and replace the current index with its result.
    pub fn load(&mut self, sources: impl Sources) -> IngestResult<LoadStats> {
        let start = Instant::now();

        let extraction = match sources.extract() {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(version = self.version, "load failed, keeping previous index: {}", e);
                return Err(e);
            }
        };
        let skipped = extraction.skipped;
        let index = CatalogIndex::from_extraction(extraction);

        let stats = LoadStats {
            version: self.version + 1,
            records: index.len(),
            groups: index.group_count(),
            keys: index.key_count(),
            skipped,
            elapsed: start.elapsed(),
            catalog: index.catalog().cloned(),
        };

        self.current = Some(Arc::new(index));
        self.version = stats.version;

        info!(
            "Load completed in {:?} (version {}, {} records in {} groups, {} skipped)",
            stats.elapsed, stats.version, stats.records, stats.groups, stats.skipped
        );
        if let Some(catalog) = &stats.catalog {
            info!("Catalog {}", catalog);
        }
        self.last_load = Some(stats.clone());
        Ok(stats)
    }

    /// The current index, if anything has been loaded.
    pub fn index(&self) -> Option<&CatalogIndex> {
        self.current.as_deref()
    }

    /// A handle on the current index that stays valid across later reloads.
    pub fn snapshot(&self) -> Option<Arc<CatalogIndex>> {
        self.current.clone()
    }

    /// Number of successful loads so far
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_load(&self) -> Option<&LoadStats> {
        self.last_load.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::payload::{Payload, SourceKind};
    use crate::sources::MemorySources;
    use serde_json::json;

    fn natives(name: &str) -> MemorySources {
        MemorySources::new().add(SourceKind::Map, json!({"PED": {"0x1": {"name": name}}}))
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(!session.is_loaded());
        assert!(session.index().is_none());
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn test_load_replaces_index() {
        let mut session = Session::new();
        let stats = session.load(natives("FIRST")).unwrap();
        assert_eq!(stats.version, 1);
        assert_eq!(stats.records, 1);
        let before = session.snapshot().unwrap();

        session.load(natives("SECOND")).unwrap();
        let index = session.index().unwrap();
        assert!(index.get_by_key("FIRST").is_none());
        assert!(index.get_by_key("SECOND").is_some());
        assert_eq!(session.version(), 2);

        // snapshots taken earlier are unaffected by the reload
        assert!(before.get_by_key("FIRST").is_some());
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let mut session = Session::new();
        session.load(natives("KEEP")).unwrap();

        let err = session
            .load((SourceKind::Array, Payload::from(json!({"not": "an array"}))))
            .unwrap_err();
        assert!(matches!(err, IngestError::Mismatch { .. }));
        assert_eq!(session.version(), 1);
        assert!(session.index().unwrap().get_by_key("KEEP").is_some());
        assert_eq!(session.last_load().unwrap().version, 1);
    }

    #[test]
    fn test_failed_first_load_leaves_nothing() {
        let mut session = Session::new();
        assert!(session.load((SourceKind::HeaderText, Payload::from(json!([])))).is_err());
        assert!(!session.is_loaded());
    }
}
