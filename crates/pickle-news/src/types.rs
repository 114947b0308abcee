/// One article record from a news search.
///
/// Transient: consumed by the ranking pipeline within a single run and
/// never persisted. Only the synthesized digest derived from it is stored.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
    pub source_name: String,
    pub url: String,
    /// ISO-8601 publication timestamp as reported upstream; `None` when the
    /// source omitted it. Missing timestamps sort last among equal scores.
    pub published_at: Option<String>,
}
