//! HTTP client for the news-search collaborator.
//!
//! Speaks the NewsAPI `/v2/everything` shape: keyword query, language
//! filter, recency sort, date range, and page size in; a list of article
//! records out.

mod client;
mod error;
mod types;

pub use client::NewsClient;
pub use error::NewsError;
pub use types::Article;
