//! HTTP client tests against a mocked backend.
//!
//! Each test mounts the endpoint under a `/whatsapp/` base path to check that
//! relative paths resolve under it, and uses `expect(n)` so the mock server
//! verifies call counts when it is dropped.

use serde_json::json;
use wabot_api::{
    AdminApi, ApiConfig, ApiError, DefaultMessage, HttpClient, QrPayload, RestrictionPatch,
    RestrictionValue,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

async fn client_for(server: &MockServer) -> HttpClient {
    let config = ApiConfig::new(&format!("{}/whatsapp", server.uri())).unwrap();
    HttpClient::new(config).unwrap()
}

#[tokio::test]
async fn status_reads_is_loged_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "isLoged": true } })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.status().await.unwrap());
}

#[tokio::test]
async fn connect_returns_raw_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "2@pairing,ref" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.connect().await.unwrap(), QrPayload::Raw("2@pairing,ref".into()));
}

#[tokio::test]
async fn disconnect_ignores_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/disconnect"))
        .respond_with(ResponseTemplate::new(200).set_body_string("bye"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn restrictions_decode_as_tagged_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/restriction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [
            { "id": 1, "title": "mainPrompt", "restriction": "Be polite", "restrictionNumber": null },
            { "id": 2, "title": "historyLimit", "restriction": null, "restrictionNumber": 20 },
        ] })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let rows = client.restrictions().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].value, RestrictionValue::Text("Be polite".into()));
    assert_eq!(rows[1].value, RestrictionValue::Numeric(20.0));
}

#[tokio::test]
async fn malformed_restriction_rows_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/restriction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [
            { "id": 1, "title": "mainPrompt", "restriction": null, "restrictionNumber": null },
            { "id": 2, "title": "historyLimit", "restriction": null, "restrictionNumber": 20 },
            { "id": 3, "title": "transferPhrase", "restriction": "agent", "restrictionNumber": 4 },
        ] })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let rows = client.restrictions().await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 2);
}

#[tokio::test]
async fn text_update_sends_only_restriction_field() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/whatsapp/restriction/1"))
        .and(body_json(json!({ "restriction": "X" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data":
            { "id": 1, "title": "mainPrompt", "restriction": "X", "restrictionNumber": null }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let updated = client.update_restriction(1, &RestrictionPatch::text("X")).await.unwrap();
    assert_eq!(updated.value, RestrictionValue::Text("X".into()));
}

#[tokio::test]
async fn numeric_update_sends_only_number_field() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/whatsapp/restriction/5"))
        .and(body_json(json!({ "restrictionNumber": 1.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data":
            { "id": 5, "title": "responseDelay", "restriction": null, "restrictionNumber": 1.5 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let updated = client.update_restriction(5, &RestrictionPatch::numeric(1.5)).await.unwrap();
    assert_eq!(updated.value, RestrictionValue::Numeric(1.5));
}

#[tokio::test]
async fn default_message_crud_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/default_messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [
            { "id": 1, "text": "Welcome!" },
        ] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/whatsapp/default_messages/"))
        .and(body_json(json!({ "message": "Hello" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 9, "text": "Hello" } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/whatsapp/default_messages/9"))
        .and(body_json(json!({ "message": "Hello again" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "id": 9, "text": "Hello again" } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/whatsapp/default_messages/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let listed = client.default_messages().await.unwrap();
    assert_eq!(listed, vec![DefaultMessage { id: 1, text: "Welcome!".into() }]);

    let created = client.create_default_message("Hello").await.unwrap();
    assert_eq!(created, DefaultMessage { id: 9, text: "Hello".into() });

    let updated = client.update_default_message(9, "Hello again").await.unwrap();
    assert_eq!(updated.text, "Hello again");

    client.delete_default_message(9).await.unwrap();
}

#[tokio::test]
async fn error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("session store offline"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    match client.status().await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "session store offline");
        },
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn bare_status_body_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isLoged": false })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(!client.status().await.unwrap());
}

#[tokio::test]
async fn bare_connect_bodies_are_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2@pairing,ref\n"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("2@quoted,ref")))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.connect().await.unwrap(), QrPayload::Raw("2@pairing,ref".into()));
    assert_eq!(client.connect().await.unwrap(), QrPayload::Raw("2@quoted,ref".into()));
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "open" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/whatsapp/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "qr": 3 })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(client.status().await, Err(ApiError::Decode(_))));
    assert!(matches!(client.connect().await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let config = ApiConfig::new("http://127.0.0.1:9/whatsapp/").unwrap();
    let client = HttpClient::new(config).unwrap();
    assert!(matches!(client.status().await, Err(ApiError::Http(_))));
}
