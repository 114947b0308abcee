//! Integration tests for `EmailClient::send`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pickle_mailer::{EmailClient, MailError};

fn test_client(server: &MockServer) -> EmailClient {
    EmailClient::with_base_url("test-token", "digest@pickle.test", 5, &server.uri())
        .expect("failed to build test EmailClient")
}

#[tokio::test]
async fn send_posts_expected_payload_and_returns_message_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header("X-Postmark-Server-Token", "test-token"))
        .and(body_partial_json(json!({
            "From": "digest@pickle.test",
            "To": "user@example.com",
            "Subject": "Your Daily Pickle 🥒",
            "HtmlBody": "<p>hi</p>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "MessageID": "abc-123",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .send("user@example.com", "Your Daily Pickle 🥒", "<p>hi</p>")
        .await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert_eq!(result.unwrap(), "abc-123");
}

#[tokio::test]
async fn send_propagates_http_error_on_non_2xx() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.send("user@example.com", "s", "<p>h</p>").await;

    assert!(
        matches!(result, Err(MailError::Http(_))),
        "expected Http error, got: {result:?}"
    );
}

#[tokio::test]
async fn send_surfaces_provider_error_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "ErrorCode": 300,
            "Message": "Invalid 'To' address"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.send("not-an-address", "s", "<p>h</p>").await;

    assert!(
        matches!(result, Err(MailError::Api(ref m)) if m.contains("Invalid")),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn send_fails_on_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.send("user@example.com", "s", "<p>h</p>").await;

    assert!(
        matches!(result, Err(MailError::Deserialize { .. })),
        "expected Deserialize error, got: {result:?}"
    );
}
