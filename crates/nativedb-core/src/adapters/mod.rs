//! Source adapters: one raw payload in, pre-normalization records out
//!
//! Each adapter handles exactly one [`SourceKind`]. Adapters never share state
//! and never fail on a single bad entry; only a payload of the wrong overall
//! shape is reported as an [`IngestError`](crate::IngestError).

mod array;
mod header;
mod map;

pub use array::{ArrayAdapter, CatalogInfo};
pub use header::{
    Declaration, HeaderTextAdapter, LOOKAHEAD_LINES, Scope, find_invoke_hash, parse_declaration,
};
pub use map::MapAdapter;

use crate::error::IngestResult;
use crate::payload::{Payload, SourceKind};
use crate::record::RawRecord;

/// What an adapter produced from one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Records in source-encounter order
    pub records: Vec<RawRecord>,
    /// Groups the source declared, including ones that ended up empty
    pub declared_groups: Vec<String>,
    /// Source units that were skipped, either malformed or outside any group
    pub skipped: usize,
    /// Header of a wrapped catalog, the first one seen when merged
    pub catalog: Option<CatalogInfo>,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append another extraction after this one
    pub fn extend(&mut self, other: Extraction) {
        self.records.extend(other.records);
        self.declared_groups.extend(other.declared_groups);
        self.skipped += other.skipped;
        if self.catalog.is_none() {
            self.catalog = other.catalog;
        }
    }

    pub(crate) fn declare(&mut self, group: &str) {
        if !self.declared_groups.iter().any(|g| g == group) {
            self.declared_groups.push(group.to_string());
        }
    }
}

/// Capability shared by all source adapters.
pub trait Adapter {
    /// The source kind this adapter accepts
    const KIND: SourceKind;

    /// Produce pre-normalization records from a payload
    fn extract(&self, payload: &Payload) -> IngestResult<Extraction>;
}

/// Route a payload through the adapter selected by `kind`.
pub fn extract(kind: SourceKind, payload: &Payload) -> IngestResult<Extraction> {
    match kind {
        SourceKind::Map => MapAdapter.extract(payload),
        SourceKind::Array => ArrayAdapter.extract(payload),
        SourceKind::HeaderText => HeaderTextAdapter.extract(payload),
    }
}
