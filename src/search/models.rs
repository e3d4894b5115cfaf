//! Search parameters and related models

use crate::config::{seconds, LimitPolicy, Settings};
use crate::locales::resolve_lang;
use crate::results::SuggestionItem;
use crate::sources::{AdditionalSource, RequestParams};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Predicate applied to the merged list
pub type ResultFilter = Arc<dyn Fn(&SuggestionItem) -> bool + Send + Sync>;

/// Custom rendering of a suggestion, given its highlighted label
pub type ResultRenderer = Arc<dyn Fn(&SuggestionItem, &str) -> String + Send + Sync>;

/// Live configuration read on every search
#[derive(Clone)]
pub struct SearchParameters {
    /// Minimum input length that triggers the remote sources
    pub min_length: usize,
    /// Result limit sent to every backend
    pub limit: usize,
    /// How the limit applies to the merged list
    pub limit_policy: LimitPolicy,
    /// Quiet period after the last keystroke
    pub debounce: Duration,
    /// Enabled sources, in merge order
    pub types: Vec<String>,
    /// Explicit language, overrides `host_lang`
    pub lang: Option<String>,
    /// Language of the host application
    pub host_lang: String,
    /// Spatial reference code
    pub sr: String,
    /// Origins searched by the location source
    pub location_origins: String,
    /// Layers searched by the feature source
    pub feature_layers: Option<String>,
    /// Offer and record history
    pub history_enabled: bool,
    /// Number of history entries kept
    pub history_capacity: usize,
    /// Upper bound on one source's response time
    pub source_timeout: Duration,
    pub filter: Option<ResultFilter>,
    pub renderer: Option<ResultRenderer>,
    pub additional_source: Option<Arc<dyn AdditionalSource>>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SearchParameters {
    /// Build parameters from settings; closures and the additional source
    /// are left unset
    pub fn from_settings(settings: &Settings) -> Self {
        let search = &settings.search;
        Self {
            min_length: search.min_length,
            limit: search.limit,
            limit_policy: search.limit_policy,
            debounce: Duration::from_millis(search.debounce_ms),
            types: search.types.clone(),
            lang: search.lang.clone(),
            host_lang: search.default_lang.clone(),
            sr: search.sr.clone(),
            location_origins: search.location_origins.clone(),
            feature_layers: search.feature_layers.clone(),
            history_enabled: settings.history.enabled,
            history_capacity: settings.history.capacity,
            source_timeout: seconds("source_timeout", search.source_timeout, 5.0),
            filter: None,
            renderer: None,
            additional_source: None,
        }
    }

    /// Set enabled sources
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_limit(mut self, limit: usize, policy: LimitPolicy) -> Self {
        self.limit = limit;
        self.limit_policy = policy;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_feature_layers(mut self, layers: impl Into<String>) -> Self {
        self.feature_layers = Some(layers.into());
        self
    }

    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history_enabled = enabled;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_filter(
        mut self,
        filter: impl Fn(&SuggestionItem) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_renderer(
        mut self,
        renderer: impl Fn(&SuggestionItem, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_additional_source(mut self, source: Arc<dyn AdditionalSource>) -> Self {
        self.additional_source = Some(source);
        self
    }

    /// Language sent to the backends
    pub fn effective_lang(&self) -> String {
        resolve_lang(self.lang.as_deref(), &self.host_lang)
    }

    /// Request parameters for one query
    pub fn request_params(&self, query: &str) -> RequestParams {
        RequestParams::new(query)
            .with_lang(self.effective_lang())
            .with_sr(self.sr.clone())
            .with_limit(self.limit)
    }

    /// Whether `query` is too short for the remote sources
    pub fn is_below_min_length(&self, query: &str) -> bool {
        query.chars().count() < self.min_length
    }
}

impl fmt::Debug for SearchParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchParameters")
            .field("min_length", &self.min_length)
            .field("limit", &self.limit)
            .field("limit_policy", &self.limit_policy)
            .field("debounce", &self.debounce)
            .field("types", &self.types)
            .field("lang", &self.lang)
            .field("host_lang", &self.host_lang)
            .field("sr", &self.sr)
            .field("location_origins", &self.location_origins)
            .field("feature_layers", &self.feature_layers)
            .field("history_enabled", &self.history_enabled)
            .field("history_capacity", &self.history_capacity)
            .field("source_timeout", &self.source_timeout)
            .field("filter", &self.filter.is_some())
            .field("renderer", &self.renderer.is_some())
            .field("additional_source", &self.additional_source.is_some())
            .finish()
    }
}
