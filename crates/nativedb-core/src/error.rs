//! Errors that abort a whole ingest

use crate::payload::SourceKind;
use std::path::PathBuf;

/// The payload as a whole could not be ingested.
///
/// Individual malformed entries never produce this; they are skipped. A miss in
/// a lookup or an empty filter result is not an error either.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{kind} source expects {expected}, got {found}")]
    Mismatch {
        kind: SourceKind,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot tell which kind of source {} is", path.display())]
    UnknownKind { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<IngestError>,
    },
}

impl IngestError {
    /// Attach the file a payload came from
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            IngestError::Read { .. }
            | IngestError::UnknownKind { .. }
            | IngestError::InFile { .. } => self,
            other => IngestError::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;
