//! Search orchestration module
//!
//! Decides between history and the sources, fans out to the enabled sources
//! and merges their results in configured order.

mod executor;
mod models;

pub use executor::Aggregator;
pub use models::*;
