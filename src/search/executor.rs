//! Suggestion aggregation across the configured sources

use super::models::SearchParameters;
use crate::cache::{request_cache_key, ResponseCache};
use crate::config::{LimitPolicy, Settings, SourceSettings};
use crate::history::HistoryStore;
use crate::metrics::Metrics;
use crate::network::HttpClient;
use crate::results::{SourceError, SuggestionItem, SuggestionSet, Timing};
use crate::sources::{AdditionalSource, RemoteSource, RequestParams, SourceAdapter, SourceLoader};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of querying one source
struct SourceOutcome {
    name: String,
    result: Result<Vec<SuggestionItem>, SourceError>,
    elapsed: Duration,
}

/// Aggregator that queries every enabled source and merges their results
///
/// It holds no per-query state: everything an invocation needs comes from
/// the [`SearchParameters`] passed to [`Aggregator::suggest`].
pub struct Aggregator {
    /// HTTP client for the remote sources
    client: HttpClient,
    /// Backend endpoints
    endpoints: SourceSettings,
    /// History answering short inputs
    history: Arc<HistoryStore>,
    /// Cache of remote responses
    cache: Option<ResponseCache>,
    metrics: Arc<Metrics>,
}

impl Aggregator {
    /// Create a new aggregator without response cache
    pub fn new(client: HttpClient, endpoints: SourceSettings, history: Arc<HistoryStore>) -> Self {
        Self {
            client,
            endpoints,
            history,
            cache: None,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Create an aggregator from settings
    pub fn from_settings(settings: &Settings, history: Arc<HistoryStore>) -> anyhow::Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        Ok(Self::new(client, settings.sources.clone(), history)
            .with_cache(ResponseCache::from_settings(&settings.cache)))
    }

    /// Set the response cache
    pub fn with_cache(mut self, cache: Option<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Drop every cached response, returning how many were held
    pub fn clear_cache(&self) -> u64 {
        match self.cache {
            Some(ref cache) => {
                let size = cache.size();
                cache.clear();
                info!("Cleared {} cached responses", size);
                size
            }
            None => 0,
        }
    }

    /// Compute the suggestions for `query`
    ///
    /// Inputs shorter than the minimum length are answered from history
    /// (when enabled) without touching any source. Otherwise every enabled
    /// source is queried concurrently and the call resolves once all of them
    /// have answered, failed or timed out. Contributions are concatenated in
    /// configured source order, never in completion order.
    pub async fn suggest(&self, query: &str, params: &SearchParameters) -> SuggestionSet {
        if params.is_below_min_length(query) {
            if !params.history_enabled {
                return SuggestionSet::new(query);
            }

            self.metrics.inc_history_search();
            let history = self.history.clone();
            let needle = query.to_string();
            // The store may read from disk
            let entries = match tokio::task::spawn_blocking(move || history.search(&needle)).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("History lookup failed: {}", e);
                    Vec::new()
                }
            };
            let items: Vec<SuggestionItem> =
                entries.into_iter().map(SuggestionItem::History).collect();
            debug!("Answering '{}' with {} history entries", query, items.len());
            return SuggestionSet::from_history(query, items);
        }

        self.metrics.inc_search();
        let registry = SourceLoader::resolve(params, &self.endpoints);
        let request_params = params.request_params(query);

        let futures: Vec<_> = registry
            .iter()
            .map(|source| self.search_source(source, &request_params, params.source_timeout))
            .collect();

        info!("Searching '{}' on {} sources", query, futures.len());

        // join_all yields outcomes in registry order regardless of completion order
        let outcomes = join_all(futures).await;

        let mut set = SuggestionSet::new(query);
        for outcome in outcomes {
            match outcome.result {
                Ok(items) => {
                    set.add_timing(Timing {
                        source: outcome.name,
                        time_ms: outcome.elapsed.as_millis() as u64,
                        result_count: items.len(),
                    });
                    set.extend_items(items);
                }
                Err(error) => set.add_failure(outcome.name, error),
            }
        }

        if let Some(ref filter) = params.filter {
            set.retain(|item| filter(item));
        }

        if params.limit_policy == LimitPolicy::Merged {
            set.truncate(params.limit);
        }

        set
    }

    /// Search a single source
    async fn search_source(
        &self,
        source: &SourceAdapter,
        params: &RequestParams,
        timeout: Duration,
    ) -> SourceOutcome {
        let name = source.name().to_string();
        let start = Instant::now();
        self.metrics.record_source_search(&name);

        debug!("Searching source {} with timeout {:?}", name, timeout);

        let result = match source {
            SourceAdapter::Remote(remote) => {
                with_timeout(timeout, self.search_remote(remote.as_ref(), params)).await
            }
            SourceAdapter::Additional(additional) => {
                with_timeout(timeout, Self::search_additional(additional.as_ref(), params)).await
            }
        };
        let elapsed = start.elapsed();

        match result {
            Ok(ref items) => {
                self.metrics.record_success(&name, elapsed.as_millis() as u64);
                debug!("Source {} returned {} results in {:?}", name, items.len(), elapsed);
            }
            Err(ref e) => {
                self.metrics.record_error(&name);
                warn!("Source {} failed: {}", name, e);
            }
        }

        SourceOutcome {
            name,
            result,
            elapsed,
        }
    }

    async fn search_remote(
        &self,
        source: &dyn RemoteSource,
        params: &RequestParams,
    ) -> Result<Vec<SuggestionItem>, SourceError> {
        let request = source.request(params)?;

        let cache_key = match self.cache {
            Some(ref cache) => {
                let key = request_cache_key(source.name(), request.full_url()?.as_str());
                if let Some(items) = cache.get(&key).await {
                    debug!("Cache hit for source {}", source.name());
                    return Ok(items);
                }
                Some(key)
            }
            None => None,
        };

        let response = self.client.execute(request).await?;
        let items = source.response(response)?;

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.set(key, items.clone()).await;
        }

        Ok(items)
    }

    async fn search_additional(
        source: &dyn AdditionalSource,
        params: &RequestParams,
    ) -> Result<Vec<SuggestionItem>, SourceError> {
        let results = source
            .search(&params.query)
            .await
            .map_err(|e| SourceError::Caller(e.to_string()))?;

        Ok(results.into_iter().map(SuggestionItem::additional).collect())
    }
}

/// Bound a source call; a zero timeout waits indefinitely
async fn with_timeout<F>(timeout: Duration, future: F) -> Result<Vec<SuggestionItem>, SourceError>
where
    F: Future<Output = Result<Vec<SuggestionItem>, SourceError>>,
{
    if timeout.is_zero() {
        return future.await;
    }

    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout),
    }
}
