//! Read-only queries over a built [`CatalogIndex`]
//!
//! Matching is plain case-folded substring containment. By default only the
//! record key is matched; [`Query::with_comments`] and [`Query::with_hashes`]
//! widen that for the native browsers that also search descriptions and hashes.

use crate::index::CatalogIndex;
use crate::record::Record;
use serde::Serialize;

/// Filter text plus matching options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    needle: String,
    comments: bool,
    hashes: bool,
    hidden: Vec<String>,
}

impl Query {
    /// A key-only filter; empty text matches everything
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
            ..Self::default()
        }
    }

    /// Match everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Also match against record comments
    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.comments = enabled;
        self
    }

    /// Also match against the hash and secondary hash
    pub fn with_hashes(mut self, enabled: bool) -> Self {
        self.hashes = enabled;
        self
    }

    /// Leave these groups out of every listing
    pub fn hiding<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden.extend(groups.into_iter().map(Into::into));
        self
    }

    /// Filter text, already lowercased
    pub fn text(&self) -> &str {
        &self.needle
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn is_hidden(&self, label: &str) -> bool {
        self.hidden.iter().any(|h| h == label)
    }

    fn contains(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    /// Whether a record passes the per-record filter
    pub fn matches_record(&self, record: &Record) -> bool {
        self.is_empty()
            || self.contains(&record.key)
            || (self.comments && self.contains(&record.comment))
            || (self.hashes
                && (self.contains(&record.hash) || self.contains(&record.secondary_hash)))
    }
}

/// One group in a cross-group listing, with the records that matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMatches<'a> {
    pub group: &'a str,
    pub records: Vec<&'a Record>,
}

/// A listed group with the total number of records it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupSummary<'a> {
    pub group: &'a str,
    pub count: usize,
}

impl CatalogIndex {
    fn sorted_labels<'a>(&'a self, query: &Query) -> Vec<&'a str> {
        let mut labels: Vec<&str> = self
            .group_labels()
            .filter(|label| !query.is_hidden(label))
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Group labels, sorted, whose label or any member record matches.
    pub fn list_groups(&self, query: &Query) -> Vec<&str> {
        self.sorted_labels(query)
            .into_iter()
            .filter(|label| {
                query.is_empty()
                    || query.contains(label)
                    || self
                        .group(label)
                        .is_some_and(|mut records| records.any(|r| query.matches_record(r)))
            })
            .collect()
    }

    /// [`CatalogIndex::list_groups`] with each group's total record count.
    pub fn group_summaries(&self, query: &Query) -> Vec<GroupSummary<'_>> {
        self.list_groups(query)
            .into_iter()
            .map(|group| GroupSummary {
                group,
                count: self.group_len(group),
            })
            .collect()
    }

    /// Matching records of one group, in stored order.
    ///
    /// An unknown or hidden group yields no records.
    pub fn list_records_in_group(&self, group: &str, query: &Query) -> Vec<&Record> {
        if query.is_hidden(group) {
            return Vec::new();
        }
        match self.group(group) {
            Some(records) => records.filter(|r| query.matches_record(r)).collect(),
            None => Vec::new(),
        }
    }

    /// Matching records of every group, groups sorted by label.
    ///
    /// Groups with no match are left out.
    pub fn list_all_records(&self, query: &Query) -> Vec<GroupMatches<'_>> {
        self.sorted_labels(query)
            .into_iter()
            .filter_map(|group| {
                let records = self.list_records_in_group(group, query);
                (!records.is_empty()).then_some(GroupMatches { group, records })
            })
            .collect()
    }

    /// First record in `group` whose hash equals `hash`.
    pub fn find_in_group(&self, group: &str, hash: &str) -> Option<&Record> {
        self.group(group)?.find(|r| r.hash == hash)
    }
}
