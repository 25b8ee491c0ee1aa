//! Label search client - one HTTP round trip per search window.
//!
//! The [`LabelSearchClient`] sends a single GET to the label endpoint with
//! `search`, `limit`, optional `skip` and optional `api_key` parameters, and
//! normalizes every failure into a [`SearchError`]. It never retries; fallback
//! and pagination policy belong to the resolver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::http_client::build_search_http_client;
use super::response::LabelResponse;
use super::{SearchError, SearchPage, SearchRequest};
use crate::user_agent;

/// Default label search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.fda.gov/drug/label.json";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// A source of label search results.
///
/// # Object Safety
///
/// This trait uses `async_trait` so resolvers can hold an
/// `Arc<dyn LabelSearch>` and tests can substitute in-memory fixtures.
#[async_trait]
pub trait LabelSearch: Send + Sync {
    /// Runs one search window.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport, HTTP, or body-level API failure;
    /// an empty result set is reported as [`SearchError::NoMatches`] when the
    /// API says so.
    async fn search(
        &self,
        request: &SearchRequest,
        api_key: Option<&str>,
    ) -> Result<SearchPage, SearchError>;
}

/// Connection settings for [`LabelSearchClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelClientConfig {
    /// Endpoint URL, including path
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub read_timeout: Duration,
}

impl Default for LabelClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

impl LabelClientConfig {
    /// Default settings pointed at a different endpoint (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// HTTP implementation of [`LabelSearch`].
#[derive(Clone)]
pub struct LabelSearchClient {
    client: Client,
    base_url: Url,
}

impl LabelSearchClient {
    /// Creates a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if HTTP client construction fails.
    pub fn new() -> Result<Self, SearchError> {
        Self::with_config(&LabelClientConfig::default())
    }

    /// Creates a client from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the base URL is not an http(s) URL or HTTP
    /// client construction fails.
    #[tracing::instrument(skip_all, fields(base_url = %config.base_url))]
    pub fn with_config(config: &LabelClientConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SearchError::transport(format!("invalid label endpoint '{}': {e}", config.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SearchError::transport(format!(
                "invalid label endpoint '{}': expected http or https",
                config.base_url
            )));
        }

        let user_agent = user_agent::default_search_user_agent();
        let client =
            build_search_http_client(&user_agent, config.connect_timeout, config.read_timeout)?;

        Ok(Self { client, base_url })
    }

    /// Endpoint this client sends requests to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request_url(&self, request: &SearchRequest, api_key: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(key) = api_key.filter(|key| !key.is_empty()) {
                pairs.append_pair("api_key", key);
            }
            pairs.append_pair("search", &request.search_expression());
            pairs.append_pair("limit", &request.limit.to_string());
            if request.skip > 0 {
                pairs.append_pair("skip", &request.skip.to_string());
            }
        }
        url
    }

    async fn execute(
        &self,
        request: &SearchRequest,
        api_key: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        let url = self.request_url(request, api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::transport(format!("Cannot reach label search API: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SearchError::transport(format!("Failed to read label search response: {e}"))
        })?;
        let parsed = serde_json::from_str::<LabelResponse>(&body);

        if !status.is_success() {
            let body_message = parsed
                .ok()
                .and_then(|resp| resp.error)
                .and_then(|error| error.message);
            return Err(SearchError::http_status(status.as_u16(), body_message));
        }

        let parsed = parsed.map_err(|e| {
            SearchError::transport(format!("Unexpected label search response format: {e}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(SearchError::api(error.message));
        }

        let total = parsed.total();
        let records = parsed.results.unwrap_or_default();
        let total = total.unwrap_or(records.len() as u64);
        Ok(SearchPage::new(records, total))
    }
}

impl std::fmt::Debug for LabelSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelSearchClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LabelSearch for LabelSearchClient {
    async fn search(
        &self,
        request: &SearchRequest,
        api_key: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        debug!(
            field = %request.field,
            value = %request.display_value(),
            limit = request.limit,
            skip = request.skip,
            "Calling label search API"
        );

        let result = self.execute(request, api_key).await;
        if let Err(error) = &result
            && !error.is_no_matches()
        {
            warn!(
                field = %request.field,
                value = %request.display_value(),
                limit = request.limit,
                skip = request.skip,
                error = %error,
                "Label search failed"
            );
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::label::SearchField;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, ResponseTemplate};

    fn client_for(server_uri: &str) -> LabelSearchClient {
        LabelSearchClient::with_config(&LabelClientConfig::with_base_url(format!(
            "{server_uri}/drug/label.json"
        )))
        .unwrap()
    }

    #[test]
    fn test_with_config_rejects_non_http_endpoint() {
        let err =
            LabelSearchClient::with_config(&LabelClientConfig::with_base_url("ftp://example.com"))
                .unwrap_err();
        assert!(err.message().contains("expected http or https"));
    }

    #[test]
    fn test_with_config_rejects_unparseable_endpoint() {
        let err = LabelSearchClient::with_config(&LabelClientConfig::with_base_url("not a url"))
            .unwrap_err();
        assert!(err.message().contains("invalid label endpoint"));
    }

    #[test]
    fn test_request_url_omits_zero_skip_and_missing_key() {
        let client = LabelSearchClient::new().unwrap();
        let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
        let url = client.request_url(&request, None);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "search".to_string(),
                    "openfda.substance_name:\"aspirin\"".to_string()
                ),
                ("limit".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url_includes_skip_and_key() {
        let client = LabelSearchClient::new().unwrap();
        let request = SearchRequest::new(SearchField::BrandName, "Bayer", 10).with_skip(20);
        let url = client.request_url(&request, Some("secret"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("api_key".to_string(), "secret".to_string())));
        assert!(pairs.contains(&("skip".to_string(), "20".to_string())));
    }

    #[tokio::test]
    async fn test_search_success_returns_records_and_total() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .and(query_param("search", "openfda.substance_name:\"aspirin\""))
            .and(query_param("limit", "100"))
            .and(query_param_is_missing("skip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"results": {"total": 2}},
                "results": [
                    {"id": "1", "openfda": {"substance_name": ["ASPIRIN"]}},
                    {"id": "2", "openfda": {"substance_name": ["ASPIRIN", "CAFFEINE"]}}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
        let page = client.search(&request, None).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].substance_names(), vec!["ASPIRIN", "CAFFEINE"]);
    }

    #[tokio::test]
    async fn test_search_total_defaults_to_record_count() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": "1"}]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::BrandName, "Bayer", 10);
        let page = client.search(&request, None).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_search_passes_api_key_and_skip() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .and(query_param("api_key", "k-123"))
            .and(query_param("skip", "2000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"results": {"total": 2500}},
                "results": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request =
            SearchRequest::new(SearchField::SubstanceName, "aspirin", 1000).with_skip(2000);
        let page = client.search(&request, Some("k-123")).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, 2500);
    }

    #[tokio::test]
    async fn test_search_not_found_is_no_matches() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": "NOT_FOUND", "message": "No matches found!"}
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::SubstanceName, "zzz", 100);
        let err = client.search(&request, None).await.unwrap_err();
        assert!(err.is_no_matches());
        assert_eq!(err.message(), "No matches found!");
    }

    #[tokio::test]
    async fn test_search_http_error_uses_body_message() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": "OVER_RATE_LIMIT", "message": "API rate limit exceeded"}
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
        let err = client.search(&request, None).await.unwrap_err();
        assert_eq!(
            err,
            SearchError::Transport {
                status: Some(429),
                message: "API rate limit exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_search_http_error_without_json_is_generic() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
        let err = client.search(&request, None).await.unwrap_err();
        assert_eq!(err.message(), "HTTP 502");
    }

    #[tokio::test]
    async fn test_search_body_error_on_success_status() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"code": "BAD_REQUEST", "message": "Syntax error in search"}
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
        let err = client.search(&request, None).await.unwrap_err();
        assert_eq!(
            err,
            SearchError::Api {
                message: "Syntax error in search".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_search_malformed_success_body_is_transport_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
        let err = client.search(&request, None).await.unwrap_err();
        assert!(matches!(err, SearchError::Transport { status: None, .. }));
        assert!(err.message().contains("Unexpected label search response format"));
    }
}
