//! Relevance ranking: weighted whole-word keyword occurrence counts.

use pickle_news::Article;
use regex::Regex;

use crate::error::DigestError;

const TOP_ARTICLES: usize = 10;

const TITLE_WEIGHT: i64 = 3;
const DESCRIPTION_WEIGHT: i64 = 2;
const CONTENT_WEIGHT: i64 = 1;

/// Order articles most-relevant-first against the FULL keyword list (not
/// just the capped search set) and return the top 10.
///
/// Score per article: whole-word occurrences of each keyword counted
/// separately in title (×3), description (×2), and content (×1), summed
/// across keywords. Matching is case-insensitive and literal — keywords
/// are escaped, never interpreted as patterns. Ties order by descending
/// publication timestamp; a missing timestamp sorts as the lowest value.
///
/// # Errors
///
/// Returns [`DigestError::Ranking`] if a keyword cannot be compiled into a
/// match pattern. Escaping makes this unreachable for ordinary input; the
/// error path exists so an unexpected fault hits the per-subscription
/// boundary instead of panicking.
pub fn rank_articles(
    articles: Vec<Article>,
    keywords: &[String],
) -> Result<Vec<Article>, DigestError> {
    let matchers = keyword_matchers(keywords)?;

    let mut scored: Vec<(i64, Article)> = articles
        .into_iter()
        .map(|article| {
            let score = relevance_score(&article, &matchers);
            (score, article)
        })
        .collect();

    scored.sort_by(|(score_a, article_a), (score_b, article_b)| {
        score_b.cmp(score_a).then_with(|| {
            let published_a = article_a.published_at.as_deref().unwrap_or("");
            let published_b = article_b.published_at.as_deref().unwrap_or("");
            published_b.cmp(published_a)
        })
    });

    if tracing::enabled!(tracing::Level::DEBUG) {
        for (i, (score, article)) in scored.iter().take(5).enumerate() {
            tracing::debug!(rank = i + 1, score, title = %article.title, "top article");
        }
    }

    Ok(scored
        .into_iter()
        .take(TOP_ARTICLES)
        .map(|(_, article)| article)
        .collect())
}

/// Compile one whole-word matcher per keyword, lowercased and escaped.
fn keyword_matchers(keywords: &[String]) -> Result<Vec<Regex>, DigestError> {
    keywords
        .iter()
        .map(|keyword| {
            let pattern = format!(r"\b{}\b", regex::escape(&keyword.to_lowercase()));
            Regex::new(&pattern)
                .map_err(|e| DigestError::Ranking(format!("keyword '{keyword}': {e}")))
        })
        .collect()
}

#[allow(clippy::cast_possible_wrap)]
fn relevance_score(article: &Article, matchers: &[Regex]) -> i64 {
    let title = article.title.to_lowercase();
    let description = article.description.to_lowercase();
    let content = article.content.to_lowercase();

    let mut score = 0;
    for matcher in matchers {
        let title_count = matcher.find_iter(&title).count() as i64;
        let description_count = matcher.find_iter(&description).count() as i64;
        let content_count = matcher.find_iter(&content).count() as i64;

        score += title_count * TITLE_WEIGHT;
        score += description_count * DESCRIPTION_WEIGHT;
        score += content_count * CONTENT_WEIGHT;
    }
    score
}
