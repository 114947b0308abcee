//! End-to-end pipeline scenarios against mock collaborators.
//!
//! Every external service (completion, news search) is a `wiremock` server;
//! no real network traffic is made and no database is required — these
//! tests exercise `build_digest` and the stage functions directly.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pickle_digest::{build_digest, extract_keywords, fetch_articles, RunContext};
use pickle_llm::CompletionClient;
use pickle_news::NewsClient;

fn llm_client(server: &MockServer) -> CompletionClient {
    let url = format!("{}/invoke", server.uri());
    CompletionClient::new(&url, "test-llm-key", 5).expect("failed to build CompletionClient")
}

fn news_client(server: &MockServer) -> NewsClient {
    NewsClient::with_base_url("test-news-key", 5, &server.uri())
        .expect("failed to build NewsClient")
}

fn article_json(url: &str, title: &str) -> serde_json::Value {
    json!({
        "source": {"name": "Example Wire"},
        "title": title,
        "description": format!("{title} description"),
        "content": format!("{title} body"),
        "url": url,
        "publishedAt": "2026-08-25T10:00:00Z"
    })
}

fn articles_body(articles: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"status": "ok", "articles": articles})
}

// ---------------------------------------------------------------------------
// Scenario A — model unreachable, no news: quiet-day digest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn model_down_and_empty_search_yields_quiet_day_digest() {
    let llm_server = MockServer::start().await;
    let news_server = MockServer::start().await;

    // Model unreachable for both keyword extraction and synthesis.
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&llm_server)
        .await;

    // Every keyword search comes back empty.
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles_body(vec![])))
        .mount(&news_server)
        .await;

    let ctx = RunContext::new(llm_client(&llm_server), news_client(&news_server));

    // The keyword fallback splits the topic itself.
    let keywords = extract_keywords(&ctx.llm, "electric vehicles").await;
    assert_eq!(keywords, vec!["electric", "vehicles"]);

    let draft = build_digest(&ctx, "electric vehicles")
        .await
        .expect("pipeline should degrade, not fail");

    assert_eq!(draft.article_count, 0);
    assert!(draft.subject_line.contains("Quiet Day"));
    assert!(draft.subject_line.contains("electric vehicles"));
    assert!(draft.html_content.contains("electric vehicles"));
}

// ---------------------------------------------------------------------------
// Scenario B — 12 candidates across 3 keywords, one duplicate URL
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_urls_collapse_and_model_synthesis_is_used() {
    let llm_server = MockServer::start().await;
    let news_server = MockServer::start().await;

    // Keyword extraction request (the prompt embeds the extraction rules).
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(body_string_contains("news search expert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            &json!({"generation": "electric vehicles, Tesla, battery technology"}),
        ))
        .mount(&llm_server)
        .await;

    // Synthesis request carries the article blocks.
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(body_string_contains("Articles to summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "generation": "SUBJECT: Your Daily Pickle 🥒 - EV week in review\n\
                HTML: <html><body><h2>Welcome to your Daily Pickle on electric vehicles!</h2>\
                <h3>Daily Recap:</h3><ul><li>things happened</li></ul></body></html>"
        })))
        .mount(&llm_server)
        .await;

    // 5 + 4 + 3 articles; the last one repeats an URL from the first batch.
    let batch_one: Vec<serde_json::Value> = (0..5)
        .map(|i| article_json(&format!("https://ev.example/{i}"), &format!("ev story {i}")))
        .collect();
    let batch_two: Vec<serde_json::Value> = (0..4)
        .map(|i| article_json(&format!("https://tesla.example/{i}"), &format!("tesla story {i}")))
        .collect();
    let batch_three = vec![
        article_json("https://battery.example/0", "battery story 0"),
        article_json("https://battery.example/1", "battery story 1"),
        article_json("https://ev.example/0", "duplicate of ev story 0"),
    ];

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "electric vehicles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles_body(batch_one)))
        .mount(&news_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "Tesla"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles_body(batch_two)))
        .mount(&news_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "battery technology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles_body(batch_three)))
        .mount(&news_server)
        .await;

    let ctx = RunContext::new(llm_client(&llm_server), news_client(&news_server));

    // Fetch+dedup alone: 12 candidates, 11 unique.
    let keywords: Vec<String> = ["electric vehicles", "Tesla", "battery technology"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let unique = fetch_articles(&ctx.news, &keywords).await;
    assert_eq!(unique.len(), 11, "duplicate URL should collapse");

    // Full pipeline: top 10 selected, model synthesis parsed.
    let draft = build_digest(&ctx, "electric vehicles")
        .await
        .expect("pipeline should succeed");

    assert_eq!(draft.article_count, 10);
    assert!(draft.subject_line.contains("🥒"));
    assert!(draft.html_content.contains("Daily Recap"));
}

// ---------------------------------------------------------------------------
// Per-keyword failure isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_keyword_failing_does_not_abort_the_fetch() {
    let news_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&news_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "working"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles_body(vec![
            article_json("https://ok.example/1", "one"),
            article_json("https://ok.example/2", "two"),
        ])))
        .mount(&news_server)
        .await;

    let news = news_client(&news_server);
    let keywords: Vec<String> = ["broken", "working"].iter().map(ToString::to_string).collect();
    let articles = fetch_articles(&news, &keywords).await;

    assert_eq!(articles.len(), 2, "working keyword's articles should survive");
}

// ---------------------------------------------------------------------------
// Synthesis fallback when the model breaks the textual protocol
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protocol_violation_falls_back_to_article_list_template() {
    let llm_server = MockServer::start().await;
    let news_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(body_string_contains("news search expert"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"generation": "solar, panels"})),
        )
        .mount(&llm_server)
        .await;

    // Synthesis responds with prose that carries neither marker.
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(body_string_contains("Articles to summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            &json!({"generation": "here is a lovely digest with no structure at all"}),
        ))
        .mount(&llm_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles_body(vec![
            article_json("https://solar.example/1", "solar farm opens"),
        ])))
        .mount(&news_server)
        .await;

    let ctx = RunContext::new(llm_client(&llm_server), news_client(&news_server));
    let draft = build_digest(&ctx, "solar power").await.expect("should degrade");

    assert_eq!(draft.article_count, 1);
    assert!(draft.subject_line.contains("solar power"));
    assert!(draft.html_content.contains("https://solar.example/1"));
    assert!(draft.html_content.contains("solar farm opens"));
}
