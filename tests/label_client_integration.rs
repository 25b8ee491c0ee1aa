//! Integration tests for the HTTP label search client.
//!
//! Runs full name resolutions and batch runs against a local mock of the
//! label endpoint.

use std::sync::Arc;

use label_query_core::{
    LabelClientConfig, LabelSearch, LabelSearchClient, QueryOrchestrator, ResolutionPath,
    SubstanceResolver,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

const LABEL_PATH: &str = "/drug/label.json";

fn resolver_for(server: &MockServer) -> SubstanceResolver {
    let config = LabelClientConfig::with_base_url(format!("{}{LABEL_PATH}", server.uri()));
    let client: Arc<dyn LabelSearch> = Arc::new(LabelSearchClient::with_config(&config).unwrap());
    SubstanceResolver::new(client)
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {"code": "NOT_FOUND", "message": "No matches found!"}
    }))
}

#[tokio::test]
async fn test_direct_resolution_over_http_sends_api_key() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .and(query_param("search", "openfda.substance_name:\"ibuprofen\""))
        .and(query_param("limit", "100"))
        .and(query_param("api_key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"results": {"skip": 0, "limit": 100, "total": 1}},
            "results": [{
                "id": "ibu-1",
                "openfda": {"substance_name": ["IBUPROFEN"], "brand_name": ["Advil"]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = resolver_for(&server)
        .resolve("ibuprofen", Some("secret-key"))
        .await
        .unwrap();

    assert_eq!(found.path, ResolutionPath::Direct);
    assert_eq!(found.record.brand_names(), vec!["Advil"]);
}

#[tokio::test]
async fn test_not_found_response_triggers_brand_fallback() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .and(query_param("search", "openfda.substance_name:\"Advil\""))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .and(query_param("search", "openfda.brand_name:\"Advil\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"results": {"total": 1}},
            "results": [{"id": "advil-1", "openfda": {"substance_name": ["IBUPROFEN"]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = resolver_for(&server).resolve("Advil", None).await.unwrap();

    assert_eq!(found.path, ResolutionPath::BrandFallback);
    assert!(!found.composite);
}

#[tokio::test]
async fn test_compound_search_joins_substances_with_and() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .and(query_param(
            "search",
            "openfda.substance_name:\"aspirin\" AND openfda.substance_name:\"caffeine\"",
        ))
        .and(query_param("limit", "50"))
        .and(query_param_is_missing("skip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"results": {"total": 1}},
            "results": [{"id": "anacin", "openfda": {"substance_name": ["ASPIRIN", "CAFFEINE"]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = resolver_for(&server)
        .resolve("aspirin; caffeine", None)
        .await
        .unwrap();

    assert_eq!(found.path, ResolutionPath::Compound);
    assert_eq!(found.record.as_value()["id"], "anacin");
}

#[tokio::test]
async fn test_server_error_fails_name_with_status_message() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = resolver_for(&server)
        .resolve("aspirin", None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 500");
}

#[tokio::test]
async fn test_batch_run_over_http_mixes_success_and_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .and(query_param("search", "openfda.substance_name:\"aspirin\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"results": {"total": 1}},
            "results": [{"id": "asp", "openfda": {"substance_name": ["ASPIRIN"]}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LABEL_PATH))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let orchestrator = QueryOrchestrator::new(resolver_for(&server), 2).unwrap();
    let batch = orchestrator
        .run(["aspirin", "notadrug"], None)
        .await
        .unwrap();

    assert!(batch.get("aspirin").unwrap().is_success());
    assert_eq!(
        batch.get("notadrug").unwrap().failure_message(),
        Some("No matches found!")
    );
}
