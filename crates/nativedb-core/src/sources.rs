//! Source providers: one or more payloads feeding a single ingest

use crate::adapters::{self, Extraction};
use crate::error::{IngestError, IngestResult};
use crate::payload::{Payload, SourceKind};
use std::path::{Path, PathBuf};

/// Trait for providing payloads to build one index from.
///
/// Extractions are concatenated in the order the payloads were added, so the
/// resulting index is the same no matter how the work was scheduled.
pub trait Sources {
    /// Run every payload through its adapter
    fn extract(self) -> IngestResult<Extraction>;
}

/// A single already-parsed payload
impl Sources for (SourceKind, Payload) {
    fn extract(self) -> IngestResult<Extraction> {
        adapters::extract(self.0, &self.1)
    }
}

/// In-memory payloads (useful for testing, or when the caller did the fetching)
#[derive(Debug, Clone, Default)]
pub struct MemorySources(Vec<(SourceKind, Payload)>);

impl MemorySources {
    /// Create empty memory sources
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a payload
    pub fn add(mut self, kind: SourceKind, payload: impl Into<Payload>) -> Self {
        self.0.push((kind, payload.into()));
        self
    }
}

impl Sources for MemorySources {
    fn extract(self) -> IngestResult<Extraction> {
        let mut out = Extraction::new();
        for (kind, payload) in &self.0 {
            out.extend(adapters::extract(*kind, payload)?);
        }
        Ok(out)
    }
}

/// Sources from an explicit list of file paths
///
/// Each file's kind is inferred from its extension and contents unless one
/// was forced with [`PathSources::kind`].
#[derive(Debug, Clone, Default)]
pub struct PathSources {
    paths: Vec<PathBuf>,
    kind: Option<SourceKind>,
}

impl PathSources {
    /// Create from an iterator of paths
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            kind: None,
        }
    }

    /// Route every file through the same adapter
    pub fn kind(mut self, kind: Option<SourceKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Read, parse and extract one file
pub fn extract_file(path: &Path, kind: Option<SourceKind>) -> IngestResult<Extraction> {
    let raw = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let sniffed = match kind {
        Some(kind) => Payload::parse(kind, &raw).map(|payload| Some((kind, payload))),
        None => Payload::sniff(path, &raw),
    };
    let (kind, payload) = sniffed
        .map_err(|e| e.in_file(path))?
        .ok_or_else(|| IngestError::UnknownKind {
            path: path.to_path_buf(),
        })?;
    let extraction = adapters::extract(kind, &payload).map_err(|e| e.in_file(path))?;
    tracing::debug!(
        path = %path.display(),
        kind = %kind,
        records = extraction.len(),
        skipped = extraction.skipped,
        "extracted source"
    );
    Ok(extraction)
}

impl Sources for PathSources {
    fn extract(self) -> IngestResult<Extraction> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let extractions: Vec<Extraction> = self
                .paths
                .par_iter()
                .map(|path| extract_file(path, self.kind))
                .collect::<IngestResult<_>>()?;

            let mut out = Extraction::new();
            for extraction in extractions {
                out.extend(extraction);
            }
            Ok(out)
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut out = Extraction::new();
            for path in &self.paths {
                out.extend(extract_file(path, self.kind)?);
            }
            Ok(out)
        }
    }
}
