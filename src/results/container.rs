//! Ordered container for the suggestions of one aggregation

use super::types::*;
use serde::Serialize;

/// Result of one aggregator invocation
///
/// Items are kept in configured source order; `failures` and `timings`
/// describe how each source behaved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionSet {
    /// Query the set was computed for
    pub query: String,
    /// Merged suggestions
    items: Vec<SuggestionItem>,
    /// Sources that contributed nothing because they failed
    failures: Vec<SourceFailure>,
    /// Per-source timings
    timings: Vec<Timing>,
    /// Whether the set was answered from history instead of the sources
    from_history: bool,
}

impl SuggestionSet {
    /// Create an empty set for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Create a set answered from history
    pub fn from_history(query: impl Into<String>, items: Vec<SuggestionItem>) -> Self {
        Self {
            query: query.into(),
            items,
            from_history: true,
            ..Default::default()
        }
    }

    /// Append one source's contribution, preserving its own order
    pub fn extend_items(&mut self, items: Vec<SuggestionItem>) {
        self.items.extend(items);
    }

    /// Record a failed source
    pub fn add_failure(&mut self, source: impl Into<String>, error: SourceError) {
        self.failures.push(SourceFailure {
            source: source.into(),
            error,
        });
    }

    /// Record source timing
    pub fn add_timing(&mut self, timing: Timing) {
        self.timings.push(timing);
    }

    /// Keep only the items accepted by `filter`
    pub fn retain(&mut self, filter: impl Fn(&SuggestionItem) -> bool) {
        self.items.retain(|item| filter(item));
    }

    /// Truncate the merged list, dropping the latest sources first
    pub fn truncate(&mut self, limit: usize) {
        self.items.truncate(limit);
    }

    pub fn items(&self) -> &[SuggestionItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<SuggestionItem> {
        self.items
    }

    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    pub fn is_from_history(&self) -> bool {
        self.from_history
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
