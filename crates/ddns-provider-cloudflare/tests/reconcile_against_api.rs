//! End-to-end: the update decision loop driving the Cloudflare directory
//! against a mock Cloudflare API.

use ddns_core::{UpdateAction, ZoneConfig, reconcile};
use ddns_provider_cloudflare::CloudflareDirectory;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECORDS_PATH: &str = "/zones/zone123/dns_records";

fn config() -> ZoneConfig {
    ZoneConfig::new("test_token", "zone123", "home.example.com", "A", 5)
}

fn directory(server: &MockServer) -> CloudflareDirectory {
    CloudflareDirectory::new_live("test_token")
        .unwrap()
        .with_base_url(server.uri())
}

fn list_response(records: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "errors": [],
        "result": records,
        "result_info": { "page": 1, "total_pages": 1 }
    }))
}

fn record_response(id: &str, content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "errors": [],
        "result": { "id": id, "type": "A", "name": "home.example.com", "content": content }
    }))
}

#[tokio::test]
async fn missing_record_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("type", "A"))
        .respond_with(list_response(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RECORDS_PATH))
        .and(body_json(serde_json::json!({
            "type": "A", "name": "home.example.com", "content": "203.0.113.5"
        })))
        .respond_with(record_response("new1", "203.0.113.5"))
        .expect(1)
        .mount(&server)
        .await;

    let result = reconcile(&directory(&server), &config(), "203.0.113.5", None)
        .await
        .unwrap();

    assert_eq!(
        result.action,
        UpdateAction::Created {
            record_id: "new1".to_string()
        }
    );
}

#[tokio::test]
async fn existing_record_is_patched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(list_response(serde_json::json!([
            { "id": "abc123", "type": "A", "name": "home.example.com", "content": "203.0.113.5" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/abc123", RECORDS_PATH)))
        .and(body_json(serde_json::json!({
            "type": "A", "name": "home.example.com", "content": "203.0.113.9"
        })))
        .respond_with(record_response("abc123", "203.0.113.9"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let result = reconcile(
        &directory(&server),
        &config(),
        "203.0.113.9",
        Some("203.0.113.5"),
    )
    .await
    .unwrap();

    assert_eq!(result.last_applied, "203.0.113.9");
}

#[tokio::test]
async fn list_failure_stops_before_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = reconcile(&directory(&server), &config(), "203.0.113.5", None)
        .await
        .unwrap_err();

    assert!(!err.is_transient());
}

#[tokio::test]
async fn unchanged_ip_never_reaches_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(list_response(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = reconcile(
        &directory(&server),
        &config(),
        "203.0.113.5",
        Some("203.0.113.5"),
    )
    .await
    .unwrap();

    assert_eq!(result.action, UpdateAction::Unchanged);
}
