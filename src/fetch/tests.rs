//! Tests for the fetch module

use super::*;
use crate::config::SourceConfig;
use crate::endpoints::{EndpointCandidate, EndpointTable};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> SourceConfig {
    SourceConfig {
        base_url: server.uri(),
        username: "store".to_string(),
        api_key: "key".to_string(),
        ..Default::default()
    }
}

fn fetcher(server: &MockServer, table: &EndpointTable, page_size: u32) -> Fetcher {
    let resolver = EndpointResolver::new(table, &source(server)).unwrap();
    Fetcher::new(HttpClient::new(), RateLimiter::disabled(), resolver)
        .with_page_size(page_size)
}

fn ids(from: u64, to: u64) -> Vec<serde_json::Value> {
    (from..to).map(|i| json!({"id": i})).collect()
}

#[tokio::test]
async fn test_pagination_stops_on_short_page() {
    let server = MockServer::start().await;

    // 5 records at page size 2: pages of 2, 2, 1. Exactly three calls.
    for (page, range) in [(1, (0, 2)), (2, (2, 4)), (3, (4, 5))] {
        Mock::given(method("GET"))
            .and(path("/api/v2/sales"))
            .and(query_param("page", page.to_string()))
            .and(query_param("rows", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(ids(range.0, range.1))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 2);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(records[0]["id"], 0);
    assert_eq!(records[4]["id"], 4);
}

#[tokio::test]
async fn test_short_first_page_fetches_nothing_more() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 1))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 2);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_fallback_skips_failing_candidate() {
    let server = MockServer::start().await;

    // First candidate errors, second succeeds, third must never be called.
    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 3))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(10, 13))))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], 0);
}

#[tokio::test]
async fn test_fallback_skips_empty_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 2))))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_wrapped_bodies_are_probed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"page": 1},
            "sales": [{"id": 1}, {"id": 2}]
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_generic_wrapper_field_is_probed_last() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "P1"}]})),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let records = fetcher
        .fetch_all(Resource::Products, &FetchParams::none())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "P1");
}

#[tokio::test]
async fn test_undecodable_body_falls_through_to_next_candidate() {
    let server = MockServer::start().await;

    // An object with no known record field is a decode error, not data.
    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 1))))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_all_candidates_exhausted_is_no_data() {
    let server = MockServer::start().await;
    // Nothing mounted: every candidate 404s.

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let records = fetcher
        .fetch_all(Resource::Restock, &FetchParams::none())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_error_after_acceptance_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 2))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 2);
    let err = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_date_params_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/sales"))
        .and(query_param("dateFrom", "2024-05-01"))
        .and(query_param("dateTo", "2024-05-01"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 1))))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let day = crate::types::parse_day("2024-05-01").unwrap();
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::day(day))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_probe_accepts_an_empty_answer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    assert_eq!(fetcher.probe(Resource::Products).await.unwrap(), 0);
}

#[tokio::test]
async fn test_probe_errors_when_nothing_answers() {
    let server = MockServer::start().await;

    let fetcher = fetcher(&server, &EndpointTable::builtin(), 50);
    let err = fetcher.probe(Resource::Products).await.unwrap_err();
    assert!(err.to_string().contains("products"));
}

#[tokio::test]
async fn test_custom_candidate_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exports/sales.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids(0, 4))))
        .expect(1)
        .mount(&server)
        .await;

    let table = EndpointTable {
        sales: vec![EndpointCandidate::new("export", "exports/sales.json")],
        ..EndpointTable::builtin()
    };

    let fetcher = fetcher(&server, &table, 50);
    let records = fetcher
        .fetch_all(Resource::Sales, &FetchParams::none())
        .await
        .unwrap();
    assert_eq!(records.len(), 4);
}
