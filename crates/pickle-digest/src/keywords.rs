//! Keyword extraction: topic string → 1–7 news-search keywords.

use pickle_llm::{CompletionClient, CompletionParams};

const MAX_KEYWORDS: usize = 7;
const MIN_KEYWORD_CHARS: usize = 2;
const FALLBACK_MAX_KEYWORDS: usize = 5;
const FALLBACK_MIN_WORD_CHARS: usize = 4;

fn keyword_prompt(topic: &str) -> String {
    format!(
        "You are a news search expert. Convert this user's topic into 5-7 keywords \
optimized for finding relevant news articles.

RULES:
- Extract the core subject matter and related terms
- Use words that commonly appear in news headlines
- Include both broad and specific terms
- Prefer simple, clear keywords over complex phrases
- Output ONLY the keywords, separated by commas

EXAMPLES:

Topic: \"Keep me informed about electric vehicle developments\"
Keywords: electric vehicles, Tesla, battery technology, EV, automotive industry, charging infrastructure

Now generate keywords for: \"{topic}\"

Keywords:"
    )
}

/// Derive search keywords for a topic via the completion service.
///
/// Never fails: a model error, or a response that parses to zero usable
/// tokens, falls back to [`fallback_keywords`]. The result is at most 7
/// entries, each at least 2 characters, in the model's (or the topic's)
/// original order.
pub async fn extract_keywords(llm: &CompletionClient, topic: &str) -> Vec<String> {
    let prompt = keyword_prompt(topic);

    match llm.complete(&prompt, CompletionParams::default()).await {
        Ok(text) => {
            let keywords = parse_keyword_list(&text);
            if keywords.is_empty() {
                tracing::warn!(topic, "model returned no usable keywords, using topic fallback");
                fallback_keywords(topic)
            } else {
                tracing::debug!(topic, count = keywords.len(), "extracted keywords from model");
                keywords
            }
        }
        Err(e) => {
            tracing::warn!(topic, error = %e, "keyword generation failed, using topic fallback");
            fallback_keywords(topic)
        }
    }
}

/// Parse a comma-separated keyword list: trim each token, drop tokens
/// shorter than 2 characters, keep the first 7.
fn parse_keyword_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|kw| kw.chars().count() >= MIN_KEYWORD_CHARS)
        .map(ToOwned::to_owned)
        .take(MAX_KEYWORDS)
        .collect()
}

/// Deterministic local heuristic used when the model is unavailable:
/// lowercase the topic, split on whitespace, keep words of at least 4
/// characters, take the first 5. May return an empty `Vec` for a topic
/// made entirely of short words; it never errors.
#[must_use]
pub fn fallback_keywords(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() >= FALLBACK_MIN_WORD_CHARS)
        .map(ToOwned::to_owned)
        .take(FALLBACK_MAX_KEYWORDS)
        .collect()
}
