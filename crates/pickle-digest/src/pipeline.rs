//! Per-subscription orchestration and the whole-run driver.

use chrono::Utc;
use pickle_db::NewDigest;
use pickle_llm::CompletionClient;
use pickle_news::NewsClient;
use sqlx::PgPool;

use crate::compose::{compose_digest, error_digest};
use crate::error::DigestError;
use crate::fetch::fetch_articles;
use crate::keywords::extract_keywords;
use crate::rank::rank_articles;
use crate::types::{DigestContent, DigestDraft};

/// Collaborator handles for one generation run.
///
/// Built once per invocation and passed down explicitly — no module-level
/// clients — so tests can substitute mock servers for every collaborator.
pub struct RunContext {
    pub llm: CompletionClient,
    pub news: NewsClient,
}

impl RunContext {
    #[must_use]
    pub fn new(llm: CompletionClient, news: NewsClient) -> Self {
        Self { llm, news }
    }
}

/// Outcome counters for one generation run.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerationSummary {
    /// Active subscriptions seen this run.
    pub total_subscriptions: usize,
    /// Digests stored as `ready_to_send` (including error digests).
    pub stored: usize,
    /// Subscriptions whose pipeline errored and received the error digest.
    pub degraded: usize,
    /// Subscriptions for which even the digest store write failed.
    pub store_failures: usize,
}

/// Run the digest pipeline for one topic: keywords → fetch+dedup → rank →
/// synthesize.
///
/// Each stage degrades internally; the only errors that surface here are
/// genuinely unexpected faults, which the caller substitutes with the
/// error digest at the subscription boundary.
///
/// # Errors
///
/// Returns [`DigestError::Ranking`] if relevance ranking fails.
pub async fn build_digest(ctx: &RunContext, topic: &str) -> Result<DigestDraft, DigestError> {
    let keywords = extract_keywords(&ctx.llm, topic).await;
    tracing::debug!(topic, ?keywords, "keywords for topic");

    let articles = fetch_articles(&ctx.news, &keywords).await;
    tracing::debug!(topic, count = articles.len(), "unique articles fetched");

    let ranked = rank_articles(articles, &keywords)?;

    let content = compose_digest(&ctx.llm, topic, &ranked).await;

    let article_count = i32::try_from(ranked.len()).unwrap_or(i32::MAX);
    Ok(DigestDraft::from_content(content, article_count))
}

/// Map a pipeline result to the draft to store: a failed build yields the
/// error digest with an article count of zero, so the subscriber still
/// receives something.
fn resolve_draft(topic: &str, result: Result<DigestDraft, DigestError>) -> (DigestDraft, bool) {
    match result {
        Ok(draft) => (draft, false),
        Err(e) => {
            tracing::error!(topic, error = %e, "digest pipeline failed, storing error digest");
            let DigestContent {
                subject_line,
                html_content,
            } = error_digest(topic);
            (
                DigestDraft {
                    subject_line,
                    html_content,
                    article_count: 0,
                },
                true,
            )
        }
    }
}

/// Generate and store today's digest for every active subscription.
///
/// Subscriptions are processed sequentially; one subscription's failure —
/// in the pipeline or in the store write — never stops the rest. The only
/// fatal condition is being unable to read the subscription list at all.
///
/// # Errors
///
/// Returns [`DigestError::Db`] if the subscription list cannot be read.
pub async fn run_generation(
    pool: &PgPool,
    ctx: &RunContext,
) -> Result<GenerationSummary, DigestError> {
    let subscriptions = pickle_db::list_active_subscriptions(pool).await?;
    let digest_date = Utc::now().date_naive();

    tracing::info!(count = subscriptions.len(), "starting digest generation run");

    let mut summary = GenerationSummary {
        total_subscriptions: subscriptions.len(),
        ..GenerationSummary::default()
    };

    for subscription in &subscriptions {
        tracing::info!(email = %subscription.email, topic = %subscription.topic, "generating digest");

        let result = build_digest(ctx, &subscription.topic).await;
        let (draft, degraded) = resolve_draft(&subscription.topic, result);
        if degraded {
            summary.degraded += 1;
        }

        let record = NewDigest {
            email: subscription.email.clone(),
            digest_date,
            topic: subscription.topic.clone(),
            subject_line: draft.subject_line,
            html_content: draft.html_content,
            article_count: draft.article_count,
        };

        match pickle_db::upsert_digest(pool, &record).await {
            Ok(()) => {
                summary.stored += 1;
                tracing::info!(
                    email = %subscription.email,
                    article_count = record.article_count,
                    "stored ready-to-send digest"
                );
            }
            Err(e) => {
                summary.store_failures += 1;
                tracing::error!(email = %subscription.email, error = %e, "failed to store digest");
            }
        }
    }

    tracing::info!(
        total = summary.total_subscriptions,
        stored = summary.stored,
        degraded = summary.degraded,
        store_failures = summary.store_failures,
        "digest generation run complete"
    );

    Ok(summary)
}
