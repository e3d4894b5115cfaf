//! Source traits and request/response types

use crate::results::{SourceError, SuggestionItem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Parameters shared by every remote request of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestParams {
    /// Query text as typed
    pub query: String,
    /// Primary language subtag
    pub lang: String,
    /// Spatial reference code
    pub sr: String,
    /// Maximum number of results per source
    pub limit: usize,
}

impl RequestParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            lang: "en".to_string(),
            sr: "4326".to_string(),
            limit: 15,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_sr(mut self, sr: impl Into<String>) -> Self {
        self.sr = sr.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// HTTP GET request built by a remote source
#[derive(Debug, Clone)]
pub struct SourceRequest {
    /// Endpoint without query string
    pub url: String,
    /// Query parameters, in order
    pub params: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
}

impl SourceRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
            headers: HashMap::new(),
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Endpoint with the URL-encoded query string appended
    pub fn full_url(&self) -> Result<Url, SourceError> {
        Url::parse_with_params(&self.url, &self.params)
            .map_err(|e| SourceError::Config(format!("invalid URL {}: {}", self.url, e)))
    }
}

/// HTTP response handed back to a remote source
#[derive(Debug)]
pub struct SourceResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl SourceResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, SourceError> {
        serde_json::from_str(&self.text)
            .map_err(|e| SourceError::Parse(format!("{} (from {})", e, self.url)))
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail on anything but 2xx
    pub fn error_for_status(self) -> Result<Self, SourceError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SourceError::Http(self.status))
        }
    }
}

/// A remote backend protocol
///
/// Implementations only translate: the aggregator executes the request,
/// enforces the timeout and turns failures into empty contributions.
pub trait RemoteSource: Send + Sync {
    /// Source identifier, as used in the configured source list
    fn name(&self) -> &str;

    /// Build the HTTP request for a query
    fn request(&self, params: &RequestParams) -> Result<SourceRequest, SourceError>;

    /// Parse the HTTP response into suggestions, in backend order
    fn response(&self, response: SourceResponse) -> Result<Vec<SuggestionItem>, SourceError>;
}

/// A source supplied by the host application
///
/// Results are opaque JSON values; `result_value` gives their display label.
#[async_trait]
pub trait AdditionalSource: Send + Sync {
    /// Search for a query
    async fn search(&self, query: &str) -> anyhow::Result<Vec<serde_json::Value>>;

    /// Label of one of this source's results
    fn result_value(&self, result: &serde_json::Value) -> String;
}

/// An enabled source, resolved from configuration
#[derive(Clone)]
pub enum SourceAdapter {
    Remote(std::sync::Arc<dyn RemoteSource>),
    Additional(std::sync::Arc<dyn AdditionalSource>),
}

impl SourceAdapter {
    pub fn name(&self) -> &str {
        match self {
            Self::Remote(source) => source.name(),
            Self::Additional(_) => super::ADDITIONAL_SOURCE,
        }
    }
}

impl std::fmt::Debug for SourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SourceAdapter").field(&self.name()).finish()
    }
}
