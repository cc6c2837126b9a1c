//! Group and by-key indices built from normalized records

use crate::adapters::{CatalogInfo, Extraction};
use crate::normalize::normalize;
use crate::record::Record;
use indexmap::IndexMap;
use std::collections::HashMap;

/// The indices produced by one ingest.
///
/// Records are stored once; the group index keeps per-group positions in
/// source-encounter order, and the by-key index maps each key to the last
/// record that carried it. Group labels keep first-seen order internally and
/// are only sorted by queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    records: Vec<Record>,
    groups: IndexMap<String, Vec<usize>>,
    by_key: HashMap<String, usize>,
    catalog: Option<CatalogInfo>,
}

impl CatalogIndex {
    /// Index already-normalized records in order.
    pub fn build(records: impl IntoIterator<Item = Record>) -> Self {
        let mut builder = IndexBuilder::new();
        for record in records {
            builder.push(record);
        }
        builder.finish()
    }

    /// Normalize and index everything an adapter produced.
    pub fn from_extraction(extraction: Extraction) -> Self {
        let mut builder = IndexBuilder::new();
        for group in &extraction.declared_groups {
            builder.declare_group(group);
        }
        for raw in extraction.records {
            builder.push(normalize(raw));
        }
        let mut index = builder.finish();
        index.catalog = extraction.catalog;
        index
    }

    /// Total number of records, duplicates included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of group buckets, empty declared groups included
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct keys reachable through [`CatalogIndex::get_by_key`]
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Group labels in first-seen order
    pub fn group_labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Whether a bucket exists for `label`
    pub fn has_group(&self, label: &str) -> bool {
        self.groups.contains_key(label)
    }

    /// Records of one group in stored order
    pub fn group(&self, label: &str) -> Option<impl Iterator<Item = &Record>> {
        let positions = self.groups.get(label)?;
        Some(positions.iter().map(|&i| &self.records[i]))
    }

    /// Number of records stored under `label`
    pub fn group_len(&self, label: &str) -> usize {
        self.groups.get(label).map_or(0, Vec::len)
    }

    /// Every stored record in ingest order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Header of the wrapped catalog this index was built from, if any
    pub fn catalog(&self) -> Option<&CatalogInfo> {
        self.catalog.as_ref()
    }

    /// Direct key lookup. A miss is an ordinary outcome.
    pub fn get_by_key(&self, key: &str) -> Option<&Record> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }
}

/// Single-pass fold from records to a [`CatalogIndex`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: CatalogIndex,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a bucket exists even if no record ends up in it.
    pub fn declare_group(&mut self, label: &str) {
        if !self.index.groups.contains_key(label) {
            self.index.groups.insert(label.to_string(), Vec::new());
        }
    }

    /// Append a record to its primary group and (re)point its key at it.
    pub fn push(&mut self, record: Record) {
        let position = self.index.records.len();
        self.index
            .groups
            .entry(record.primary_group().to_string())
            .or_default()
            .push(position);
        self.index.by_key.insert(record.key.clone(), position);
        self.index.records.push(record);
    }

    pub fn finish(self) -> CatalogIndex {
        self.index
    }
}
