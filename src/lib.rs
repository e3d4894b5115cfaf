//! ga-search: search-as-you-type suggestions for geographic search
//!
//! Queries geo.admin.ch SearchServer, Photon and host-supplied sources as the
//! user types, merges their results in configured order, highlights matches
//! and replays recent selections from a persisted history.

pub mod cache;
pub mod config;
pub mod controller;
pub mod highlight;
pub mod history;
pub mod locales;
pub mod metrics;
pub mod network;
pub mod results;
pub mod search;
pub mod sources;

pub use config::Settings;
pub use controller::{RenderedSuggestion, SubmitEvent, SuggestionController};
pub use history::{HistoryEntry, HistoryStore};
pub use results::{Feature, SuggestionItem, SuggestionSet};
pub use search::{Aggregator, SearchParameters};
pub use sources::{AdditionalSource, RemoteSource};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
