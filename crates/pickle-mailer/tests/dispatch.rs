//! Dispatch-run integration tests: real Postgres rows, mock email API.

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pickle_db::NewDigest;
use pickle_mailer::{run_dispatch, EmailClient};

fn test_client(server: &MockServer) -> EmailClient {
    EmailClient::with_base_url("test-token", "digest@pickle.test", 5, &server.uri())
        .expect("failed to build test EmailClient")
}

async fn seed_digest(pool: &sqlx::PgPool, email: &str, subject: &str) {
    pickle_db::upsert_digest(
        pool,
        &NewDigest {
            email: email.to_owned(),
            digest_date: Utc::now().date_naive(),
            topic: "electric vehicles".to_owned(),
            subject_line: subject.to_owned(),
            html_content: "<html><body><p>hi</p></body></html>".to_owned(),
            article_count: 3,
        },
    )
    .await
    .expect("seed digest");
}

async fn statuses_by_email(pool: &sqlx::PgPool) -> Vec<(String, String)> {
    sqlx::query_as::<_, (String, String)>(
        "SELECT email, status FROM digests ORDER BY email",
    )
    .fetch_all(pool)
    .await
    .expect("read digest statuses")
}

#[sqlx::test(migrations = "../../migrations")]
async fn dispatch_marks_sent_digests(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "MessageID": "m-1",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(2)
        .mount(&server)
        .await;

    seed_digest(&pool, "a@example.com", "Digest A").await;
    seed_digest(&pool, "b@example.com", "Digest B").await;

    let summary = run_dispatch(&pool, &test_client(&server))
        .await
        .expect("dispatch run");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.failed, 0);

    let statuses = statuses_by_email(&pool).await;
    assert!(statuses.iter().all(|(_, s)| s == "sent"), "{statuses:?}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn one_send_failure_does_not_stop_the_run(pool: sqlx::PgPool) {
    let server = MockServer::start().await;

    // Provider rejects one recipient, accepts the other.
    Mock::given(method("POST"))
        .and(path("/email"))
        .and(body_partial_json(json!({"To": "bad@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "ErrorCode": 300,
            "Message": "Invalid 'To' address"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "MessageID": "m-2",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    seed_digest(&pool, "bad@example.com", "Digest Bad").await;
    seed_digest(&pool, "good@example.com", "Digest Good").await;

    let summary = run_dispatch(&pool, &test_client(&server))
        .await
        .expect("dispatch run");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.failed, 1);

    let statuses = statuses_by_email(&pool).await;
    assert_eq!(
        statuses,
        vec![
            ("bad@example.com".to_owned(), "failed".to_owned()),
            ("good@example.com".to_owned(), "sent".to_owned()),
        ]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn dispatched_digests_are_not_picked_up_again(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "MessageID": "m-3",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    seed_digest(&pool, "once@example.com", "Digest Once").await;

    let first = run_dispatch(&pool, &test_client(&server))
        .await
        .expect("first run");
    assert_eq!(first.sent, 1);

    let second = run_dispatch(&pool, &test_client(&server))
        .await
        .expect("second run");
    assert_eq!(second.total, 0, "sent digest must not be re-dispatched");
}
