//! Suggestion types and the container for aggregated suggestions

mod container;
mod types;

pub use container::SuggestionSet;
pub use types::*;
