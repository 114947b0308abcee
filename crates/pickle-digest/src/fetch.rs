//! Multi-keyword article fetch with URL deduplication.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use pickle_news::{Article, NewsClient};

const MAX_SEARCH_KEYWORDS: usize = 5;
const SEARCH_WINDOW_DAYS: i64 = 7;
const PAGE_SIZE: u32 = 30;

/// Query the news search once per keyword (first 5 only) over the trailing
/// 7 days and merge the results, deduplicated by URL.
///
/// Per-keyword failures are logged and skipped so one bad query never
/// aborts the fetch; if every query fails the result is simply empty,
/// which routes the digest to the quiet-day path downstream.
pub async fn fetch_articles(news: &NewsClient, keywords: &[String]) -> Vec<Article> {
    let to = Utc::now().date_naive();
    let from = to - Duration::days(SEARCH_WINDOW_DAYS);

    let mut articles = Vec::new();

    for keyword in keywords.iter().take(MAX_SEARCH_KEYWORDS) {
        match news.search_everything(keyword, from, to, PAGE_SIZE).await {
            Ok(batch) => {
                tracing::debug!(keyword, count = batch.len(), "keyword search returned articles");
                articles.extend(batch);
            }
            Err(e) => {
                tracing::warn!(keyword, error = %e, "keyword search failed, continuing");
            }
        }
    }

    let unique = dedup_by_url(articles);
    tracing::debug!(count = unique.len(), "unique articles after dedup");
    unique
}

/// Keep the first occurrence of each URL, preserving insertion order.
fn dedup_by_url(mut articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    articles.retain(|article| seen_urls.insert(article.url.clone()));
    articles
}
