/// A synthesized digest: the `(subject, html)` pair every compose path
/// guarantees to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestContent {
    pub subject_line: String,
    pub html_content: String,
}

/// The generator's output for one subscription, ready to be stored as a
/// `ready_to_send` record.
#[derive(Debug, Clone)]
pub struct DigestDraft {
    pub subject_line: String,
    pub html_content: String,
    pub article_count: i32,
}

impl DigestDraft {
    pub(crate) fn from_content(content: DigestContent, article_count: i32) -> Self {
        Self {
            subject_line: content.subject_line,
            html_content: content.html_content,
            article_count,
        }
    }
}
