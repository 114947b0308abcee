use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::NewsError;
use crate::types::Article;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
struct WireArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(default)]
    source: WireSource,
}

#[derive(Debug, Default, Deserialize)]
struct WireSource {
    name: Option<String>,
}

/// Client for the news-search API.
///
/// Manages the HTTP client, API key, and base URL. Use [`NewsClient::new`]
/// for production or [`NewsClient::with_base_url`] to point at a mock
/// server in tests.
pub struct NewsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsClient {
    /// Creates a new client pointed at the production news API with the
    /// default 15-second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str) -> Result<Self, NewsError> {
        Self::with_base_url(api_key, DEFAULT_TIMEOUT_SECS, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom timeout and base URL (for testing
    /// with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pickle/0.1 (daily-digest)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Searches `/v2/everything` for one keyword: English only, sorted by
    /// recency, bounded to the `[from, to]` publication window, up to
    /// `page_size` results.
    ///
    /// Articles without a URL are dropped — they cannot be deduplicated or
    /// linked in a digest.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Http`] on network failure or a non-2xx HTTP status.
    /// - [`NewsError::Api`] if the API body reports an error status.
    /// - [`NewsError::Deserialize`] if the body is not the expected shape.
    pub async fn search_everything(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
        page_size: u32,
    ) -> Result<Vec<Article>, NewsError> {
        let url = format!("{}/v2/everything", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("q", query),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("from", &from.format("%Y-%m-%d").to_string()),
                ("to", &to.format("%Y-%m-%d").to_string()),
                ("pageSize", &page_size.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: EverythingResponse =
            serde_json::from_str(&body).map_err(|e| NewsError::Deserialize {
                context: format!("everything(q={query})"),
                source: e,
            })?;

        if parsed.status.as_deref() == Some("error") {
            return Err(NewsError::Api(
                parsed.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let articles = parsed
            .articles
            .into_iter()
            .filter_map(|wire| {
                let url = wire.url.filter(|u| !u.is_empty())?;
                Some(Article {
                    title: wire.title.unwrap_or_default(),
                    description: wire.description.unwrap_or_default(),
                    content: wire.content.unwrap_or_default(),
                    source_name: wire.source.name.unwrap_or_default(),
                    url,
                    published_at: wire.published_at,
                })
            })
            .collect();

        Ok(articles)
    }
}
