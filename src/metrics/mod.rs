//! Metrics collection module
//!
//! Tracks source response times, failure rates and invocation counts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Response times kept per source
const RESPONSE_TIME_WINDOW: usize = 100;

/// Source metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    /// Aggregator invocations answered by the sources
    total_searches: AtomicU64,
    /// Aggregator invocations answered from history
    history_searches: AtomicU64,
    /// Searches per source
    source_searches: RwLock<HashMap<String, u64>>,
    /// Source response times in ms, most recent last
    source_response_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Source error counts
    source_errors: RwLock<HashMap<String, u64>>,
    /// Source success counts
    source_successes: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_history_search(&self) {
        self.history_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record that a source was queried
    pub fn record_source_search(&self, source: &str) {
        let mut searches = self.source_searches.write().unwrap_or_else(PoisonError::into_inner);
        *searches.entry(source.to_string()).or_insert(0) += 1;
    }

    /// Record a successful response and its duration
    pub fn record_success(&self, source: &str, time_ms: u64) {
        {
            let mut successes = self.source_successes.write().unwrap_or_else(PoisonError::into_inner);
            *successes.entry(source.to_string()).or_insert(0) += 1;
        }

        let mut times = self
            .source_response_times
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = times.entry(source.to_string()).or_default();
        if entry.len() >= RESPONSE_TIME_WINDOW {
            entry.remove(0);
        }
        entry.push(time_ms);
    }

    /// Record a failed source
    pub fn record_error(&self, source: &str) {
        let mut errors = self.source_errors.write().unwrap_or_else(PoisonError::into_inner);
        *errors.entry(source.to_string()).or_insert(0) += 1;
    }

    pub fn total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    pub fn history_searches(&self) -> u64 {
        self.history_searches.load(Ordering::Relaxed)
    }

    /// Number of times a source was queried
    pub fn source_searches(&self, source: &str) -> u64 {
        let searches = self.source_searches.read().unwrap_or_else(PoisonError::into_inner);
        searches.get(source).copied().unwrap_or(0)
    }

    /// Average response time of a source over the recent window
    pub fn avg_response_time(&self, source: &str) -> Option<u64> {
        let times = self.source_response_times.read().unwrap_or_else(PoisonError::into_inner);
        times.get(source).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    /// Percentage of successful responses of a source
    pub fn reliability(&self, source: &str) -> f64 {
        let errors = self.source_errors.read().unwrap_or_else(PoisonError::into_inner);
        let successes = self.source_successes.read().unwrap_or_else(PoisonError::into_inner);

        let error_count = errors.get(source).copied().unwrap_or(0);
        let success_count = successes.get(source).copied().unwrap_or(0);

        let total = error_count + success_count;
        if total == 0 {
            100.0
        } else {
            (success_count as f64 / total as f64) * 100.0
        }
    }

    /// Statistics of every source queried so far
    pub fn source_stats(&self) -> HashMap<String, SourceStats> {
        let names: Vec<String> = {
            let searches = self.source_searches.read().unwrap_or_else(PoisonError::into_inner);
            searches.keys().cloned().collect()
        };

        names
            .into_iter()
            .map(|name| {
                let stats = SourceStats {
                    searches: self.source_searches(&name),
                    avg_response_time: self.avg_response_time(&name),
                    reliability: self.reliability(&name),
                };
                (name, stats)
            })
            .collect()
    }
}

/// Statistics for a single source
#[derive(Debug, Clone)]
pub struct SourceStats {
    pub searches: u64,
    pub avg_response_time: Option<u64>,
    pub reliability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.inc_search();
        metrics.record_source_search("location");
        metrics.record_success("location", 100);
        metrics.record_source_search("location");
        metrics.record_error("location");

        assert_eq!(metrics.total_searches(), 1);
        assert_eq!(metrics.source_searches("location"), 2);
        assert_eq!(metrics.avg_response_time("location"), Some(100));
        assert_eq!(metrics.reliability("location"), 50.0);
        assert_eq!(metrics.reliability("layer"), 100.0);
        assert_eq!(metrics.source_stats()["location"].searches, 2);
    }

    #[test]
    fn test_response_time_window() {
        let metrics = Metrics::new();
        for _ in 0..RESPONSE_TIME_WINDOW {
            metrics.record_success("layer", 10);
        }
        metrics.record_success("layer", 10 + RESPONSE_TIME_WINDOW as u64 * 10);

        assert_eq!(metrics.avg_response_time("layer"), Some(20));
    }
}
