//! Ordered registry of the sources enabled for one invocation

use super::traits::SourceAdapter;

/// Enabled sources in merge order
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceAdapter>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; it merges after every source registered before it
    pub fn register(&mut self, source: SourceAdapter) {
        self.sources.push(source);
    }

    /// Insert a source at a merge position, clamped to the current length
    pub fn insert(&mut self, position: usize, source: SourceAdapter) {
        let position = position.min(self.sources.len());
        self.sources.insert(position, source);
    }

    /// Get the first source with a name
    pub fn get(&self, name: &str) -> Option<&SourceAdapter> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Sources in merge order
    pub fn iter(&self) -> impl Iterator<Item = &SourceAdapter> {
        self.sources.iter()
    }

    /// Source names in merge order
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Check if a source is enabled
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
