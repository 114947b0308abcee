//! Digest synthesis: topic + ranked articles → `(subject, html)`.
//!
//! The model contract is a textual protocol: the response must carry a
//! `SUBJECT:` line followed by an `HTML:` marker. Responses without both
//! markers, and model failures of any kind, route to deterministic
//! templates — no path out of this module can fail.

use pickle_llm::{CompletionClient, CompletionParams};
use pickle_news::Article;
use rand::seq::IndexedRandom;

use crate::types::DigestContent;

const SUBJECT_MARKER: &str = "SUBJECT:";
const HTML_MARKER: &str = "HTML:";

const CONTENT_EXCERPT_CHARS: usize = 200;
const FALLBACK_ARTICLE_LIMIT: usize = 5;

const QUIET_DAY_PUNS: &[&str] = &[
    "Looks like we're in a pickle! 🥒 No major news updates today.",
    "Nothing to dill with today! 🥒 Your topic was quiet in the news.",
    "We're in a jam... or should we say pickle? 🥒 No new developments!",
    "Sweet and sour news: no updates today, but we'll keep you pickled! 🥒",
];

const HTML_SHELL_STYLE: &str = "font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;";

/// Synthesize the digest for a topic from its ranked articles.
///
/// Never fails outward: with no articles the quiet-day template is
/// returned; with articles the model is asked for a structured recap, and
/// any model failure or protocol violation falls back to the deterministic
/// article-list template.
pub async fn compose_digest(
    llm: &CompletionClient,
    topic: &str,
    articles: &[Article],
) -> DigestContent {
    if articles.is_empty() {
        return quiet_day_digest(topic);
    }

    let prompt = digest_prompt(topic, articles);

    match llm.complete(&prompt, CompletionParams::default()).await {
        Ok(text) => parse_subject_html(&text).unwrap_or_else(|| {
            tracing::warn!(topic, "model response missing subject/html markers, using fallback");
            fallback_digest(topic, articles)
        }),
        Err(e) => {
            tracing::warn!(topic, error = %e, "digest synthesis failed, using fallback");
            fallback_digest(topic, articles)
        }
    }
}

/// Split a model response on the `HTML:` marker; the part before it, minus
/// the `SUBJECT:` prefix, is the subject line. Returns `None` unless both
/// markers are present and both halves are non-empty.
fn parse_subject_html(text: &str) -> Option<DigestContent> {
    let (head, html) = text.split_once(HTML_MARKER)?;
    let subject_start = head.find(SUBJECT_MARKER)?;
    let subject = head[subject_start + SUBJECT_MARKER.len()..].trim();
    let html = html.trim();

    if subject.is_empty() || html.is_empty() {
        return None;
    }

    Some(DigestContent {
        subject_line: subject.to_string(),
        html_content: html.to_string(),
    })
}

fn digest_prompt(topic: &str, articles: &[Article]) -> String {
    let mut articles_text = String::new();
    for (i, article) in articles.iter().enumerate() {
        let title = non_empty_or(&article.title, "No title");
        let description = non_empty_or(&article.description, "No description");
        let source = non_empty_or(&article.source_name, "Unknown");
        let published = article.published_at.as_deref().unwrap_or("Unknown date");
        let preview = excerpt(&article.content, CONTENT_EXCERPT_CHARS);

        articles_text.push_str(&format!(
            "\nArticle {n}:\nTitle: {title}\nDescription: {description}\n\
Content Preview: {preview}\nSource: {source}\nPublished: {published}\n---\n",
            n = i + 1,
        ));
    }

    format!(
        "Create a personalized daily news digest email for someone interested in: \"{topic}\"

Requirements:
- Write a catchy subject line with pickle emoji 🥒
- Follow this exact structure:
  * Welcome message: \"Welcome to your Daily Pickle on [topic of interest]!\"
  * Section: \"Daily Recap:\"
  * Group related stories under appropriate subheadings
  * Use bullet points for key developments under each subheading
  * End with: \"Thanks for reading the Pickle, see you tomorrow!\"
- Use friendly, informative tone
- Format as clean HTML with proper styling
- Keep bullet points concise but informative

Articles to summarize:
{articles_text}
Format your response as:
SUBJECT: [subject line here]
HTML: [HTML email content here]

Example structure:
<html><body style=\"{HTML_SHELL_STYLE}\">
<h2 style=\"color: #2E8B57;\">Welcome to your Daily Pickle on [topic]!</h2>

<h3>Daily Recap:</h3>

<h4>[Appropriate Subheading]</h4>
<ul>
<li>[Key development 1]</li>
<li>[Key development 2]</li>
</ul>

<p><strong>Thanks for reading the Pickle, see you tomorrow!</strong></p>
</body></html>"
    )
}

/// The deterministic no-news template: a pun and a reassurance, flavored
/// with the topic.
fn quiet_day_digest(topic: &str) -> DigestContent {
    let pun = QUIET_DAY_PUNS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(QUIET_DAY_PUNS[0]);

    DigestContent {
        subject_line: format!("Your Daily Pickle 🥒 - Quiet Day for {topic}"),
        html_content: format!(
            "<html><body style=\"{HTML_SHELL_STYLE}\">\n\
<h2 style=\"color: #2E8B57;\">Your Daily Pickle 🥒</h2>\n\
<p>{pun}</p>\n\
<p>We searched but didn't find significant news about <strong>{topic}</strong> today.</p>\n\
<p>We'll be back tomorrow with fresh updates. Stay pickled! 🥒</p>\n\
</body></html>"
        ),
    }
}

/// The deterministic model-failure template: up to five linked headlines.
fn fallback_digest(topic: &str, articles: &[Article]) -> DigestContent {
    let mut items = String::new();
    for article in articles.iter().take(FALLBACK_ARTICLE_LIMIT) {
        let title = non_empty_or(&article.title, "No title");
        let source = non_empty_or(&article.source_name, "Unknown");
        items.push_str(&format!(
            "<li><a href=\"{url}\" target=\"_blank\"><strong>{title}</strong></a> ({source})</li>",
            url = article.url,
        ));
    }

    DigestContent {
        subject_line: format!("Your Daily Pickle 🥒 - {topic} Updates"),
        html_content: format!(
            "<html><body style=\"{HTML_SHELL_STYLE}\">\n\
<h2 style=\"color: #2E8B57;\">Your Daily Pickle 🥒</h2>\n\
<p>Here are today's updates about <strong>{topic}</strong>:</p>\n\
<ul>{items}</ul>\n\
<p>Stay pickled! 🥒</p>\n\
</body></html>"
        ),
    }
}

/// The template substituted by the orchestration boundary when a
/// subscription's pipeline fails outright.
#[must_use]
pub fn error_digest(topic: &str) -> DigestContent {
    DigestContent {
        subject_line: "Your Daily Pickle 🥒 - Technical Hiccup".to_string(),
        html_content: format!(
            "<html><body style=\"{HTML_SHELL_STYLE}\">\n\
<h2 style=\"color: #2E8B57;\">Your Daily Pickle 🥒</h2>\n\
<p>We ran into a technical pickle while gathering news about <strong>{topic}</strong>!</p>\n\
<p>Our team is working on it. We'll be back tomorrow with your regular digest.</p>\n\
<p>Stay pickled! 🥒</p>\n\
</body></html>"
        ),
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: title.to_string(),
            description: "desc".to_string(),
            content: "body text".to_string(),
            source_name: "Test Wire".to_string(),
            url: url.to_string(),
            published_at: Some("2026-08-25T12:00:00Z".to_string()),
        }
    }

    #[test]
    fn parse_extracts_subject_and_html() {
        let text = "SUBJECT: Your Daily Pickle 🥒 - EV news\nHTML: <html><body>hi</body></html>";
        let content = parse_subject_html(text).expect("expected parse to succeed");
        assert_eq!(content.subject_line, "Your Daily Pickle 🥒 - EV news");
        assert_eq!(content.html_content, "<html><body>hi</body></html>");
    }

    #[test]
    fn parse_tolerates_preamble_before_subject_marker() {
        let text = "Sure, here is the digest:\nSUBJECT: hello\nHTML: <p>x</p>";
        let content = parse_subject_html(text).expect("expected parse to succeed");
        assert_eq!(content.subject_line, "hello");
    }

    #[test]
    fn parse_rejects_missing_markers() {
        assert!(parse_subject_html("just some prose with no protocol").is_none());
        assert!(parse_subject_html("SUBJECT: only a subject").is_none());
        assert!(parse_subject_html("HTML: <p>only html</p>").is_none());
    }

    #[test]
    fn parse_rejects_empty_halves() {
        assert!(parse_subject_html("SUBJECT: \nHTML: <p>x</p>").is_none());
        assert!(parse_subject_html("SUBJECT: s\nHTML:   ").is_none());
    }

    #[test]
    fn quiet_day_references_topic_and_is_well_formed() {
        let content = quiet_day_digest("electric vehicles");
        assert!(content.subject_line.contains("electric vehicles"));
        assert!(content.subject_line.contains("🥒"));
        assert!(content.html_content.contains("electric vehicles"));
        assert!(!content.html_content.is_empty());
    }

    #[test]
    fn fallback_lists_at_most_five_linked_articles() {
        let articles: Vec<Article> = (0..8)
            .map(|i| article(&format!("title {i}"), &format!("https://example.com/{i}")))
            .collect();
        let content = fallback_digest("ev", &articles);
        assert_eq!(content.html_content.matches("<li>").count(), 5);
        assert!(content.html_content.contains("https://example.com/0"));
        assert!(!content.html_content.contains("https://example.com/5"));
    }

    #[test]
    fn error_digest_is_non_empty_and_references_topic() {
        let content = error_digest("quantum computing");
        assert!(content.subject_line.contains("Technical Hiccup"));
        assert!(content.html_content.contains("quantum computing"));
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        let text = "🥒".repeat(300);
        let cut = excerpt(&text, 200);
        assert_eq!(cut.chars().count(), 200);
    }

    #[test]
    fn prompt_includes_each_article_block() {
        let articles = vec![
            article("first headline", "https://example.com/1"),
            article("second headline", "https://example.com/2"),
        ];
        let prompt = digest_prompt("ev", &articles);
        assert!(prompt.contains("Article 1:"));
        assert!(prompt.contains("first headline"));
        assert!(prompt.contains("Article 2:"));
        assert!(prompt.contains("second headline"));
        assert!(prompt.contains("SUBJECT:"));
        assert!(prompt.contains("HTML:"));
    }
}
