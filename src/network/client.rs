//! HTTP client for requests to the search backends

use crate::config::{seconds, OutgoingSettings};
use crate::results::SourceError;
use crate::sources::{SourceRequest, SourceResponse};
use anyhow::Result;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// Accept header for the JSON backends
const ACCEPT_JSON: &str = "application/geo+json,application/json;q=0.9,*/*;q=0.1";

/// HTTP client wrapper with backend-specific configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = seconds("request_timeout", settings.request_timeout, 10.0);
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(settings.useragent.clone())
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: timeout,
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Execute a source request
    pub async fn execute(&self, request: SourceRequest) -> Result<SourceResponse, SourceError> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute a source request with custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: SourceRequest,
        timeout: Duration,
    ) -> Result<SourceResponse, SourceError> {
        let url = request.full_url()?;

        let mut req_builder = self
            .client
            .get(url)
            .timeout(timeout)
            .header("Accept", ACCEPT_JSON);

        for (key, value) in self.extra_headers.iter().chain(request.headers.iter()) {
            req_builder = req_builder.header(key, value);
        }

        let response = req_builder.send().await.map_err(Self::map_error)?;

        Self::parse_response(response).await
    }

    /// Parse response into SourceResponse
    async fn parse_response(response: Response) -> Result<SourceResponse, SourceError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let text = response.text().await.map_err(Self::map_error)?;

        Ok(SourceResponse { status, text, url })
    }

    fn map_error(error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_execute_encodes_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Bern & Thun"))
            .and(header("Accept", ACCEPT_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = SourceRequest::get(format!("{}/search", server.uri())).param("q", "Bern & Thun");
        let response = client.execute(request).await.unwrap();

        assert!(response.is_success());
        assert_eq!(response.text, "{}");
    }

    #[tokio::test]
    async fn test_invalid_timeout_uses_default() {
        for request_timeout in [-3.0, f64::NAN, f64::MAX] {
            let settings = OutgoingSettings {
                request_timeout,
                ..Default::default()
            };
            let client = HttpClient::with_settings(&settings).unwrap();
            assert_eq!(client.default_timeout, Duration::from_secs(10));
        }
    }

    #[tokio::test]
    async fn test_request_and_extra_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Accept-Language", "de"))
            .and(header("X-Client", "ga-search-tests"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = OutgoingSettings::default();
        settings
            .extra_headers
            .insert("X-Client".to_string(), "ga-search-tests".to_string());
        let client = HttpClient::with_settings(&settings).unwrap();
        let request = SourceRequest::get(server.uri()).header("Accept-Language", "de");

        assert!(client.execute(request).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = HttpClient::new().unwrap();
        let request = SourceRequest::get("http://127.0.0.1:9/unreachable");
        let error = client.execute(request).await.unwrap_err();

        assert!(matches!(error, SourceError::Network(_) | SourceError::Timeout));
    }
}
