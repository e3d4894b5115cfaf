//! Recency log of submitted suggestions
//!
//! The store keeps the most recent selections, most recent first, bounded by
//! a configurable capacity. Entries are persisted through a [`KeyValueStore`]
//! on a best-effort basis: storage failures are logged and never surface to
//! the caller.

mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

use crate::config::HistorySettings;
use crate::results::SuggestionItem;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Namespace key the history is persisted under
pub const HISTORY_KEY: &str = "ga-search.history";

/// Default number of entries kept
pub const DEFAULT_CAPACITY: usize = 10;

static GLOBAL: OnceCell<Arc<HistoryStore>> = OnceCell::new();

/// A submitted suggestion and the label it is looked up by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Display label at submission time; unique within the store
    pub key: String,
    /// The submitted item, never itself a history entry
    pub item: Box<SuggestionItem>,
}

impl HistoryEntry {
    pub fn new(key: impl Into<String>, item: SuggestionItem) -> Self {
        Self {
            key: key.into(),
            item: Box::new(item.into_unwrapped()),
        }
    }
}

/// Bounded, persisted, most-recent-first history
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    capacity: AtomicUsize,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Create a store on top of a storage medium
    pub fn new(storage: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            storage,
            capacity: AtomicUsize::new(capacity),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store that lives only as long as the process
    pub fn in_memory(capacity: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new()), capacity)
    }

    /// Create a store from history settings
    pub fn from_settings(settings: &HistorySettings) -> Self {
        let file_store = match settings.storage_dir {
            Some(ref dir) => Some(FileStore::new(dir)),
            None => FileStore::default_location(),
        };
        let storage: Arc<dyn KeyValueStore> = match file_store {
            Some(store) => {
                debug!("History stored in {}", store.dir().display());
                Arc::new(store)
            }
            None => {
                warn!("No data directory available, history will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        Self::new(storage, settings.capacity)
    }

    /// The process-wide store, created on first use
    pub fn global() -> Arc<HistoryStore> {
        Self::global_with(&HistorySettings::default())
    }

    /// The process-wide store; `settings` only apply if this call creates it
    pub fn global_with(settings: &HistorySettings) -> Arc<HistoryStore> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::from_settings(settings)))
            .clone()
    }

    /// All entries, most recent first
    pub fn get(&self) -> Vec<HistoryEntry> {
        let mut entries = self.load();
        entries.truncate(self.capacity());
        entries
    }

    /// Entries whose key contains `query`, ignoring case
    ///
    /// An empty query returns the whole history.
    pub fn search(&self, query: &str) -> Vec<HistoryEntry> {
        let entries = self.get();
        if query.is_empty() {
            return entries;
        }

        let query = query.to_lowercase();
        entries
            .into_iter()
            .filter(|entry| entry.key.to_lowercase().contains(&query))
            .collect()
    }

    /// Insert an entry at the front, replacing any entry with the same key
    pub fn add(&self, entry: HistoryEntry) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.load();
        entries.retain(|existing| existing.key != entry.key);
        debug!("Adding history entry: {}", entry.key);
        entries.insert(0, entry);
        entries.truncate(self.capacity());

        self.persist(&entries);
    }

    /// Remove every entry
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.persist(&[]);
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }

    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    fn load(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring corrupt history: {}", e);
                Vec::new()
            }
        }
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        let result = serde_json::to_string(entries)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.set(HISTORY_KEY, &raw));

        if let Err(e) = result {
            warn!("Dropping history write: {}", e);
        }
    }
}
