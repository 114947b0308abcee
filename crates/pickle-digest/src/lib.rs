//! The digest generation pipeline.
//!
//! For every active subscription: derive search keywords from the topic via
//! the completion service (with a deterministic fallback), fan the keywords
//! out to the news search, deduplicate by URL, rank by keyword relevance,
//! and synthesize an HTML digest (again with deterministic fallbacks).
//!
//! Every stage degrades rather than fails: a dead model, an empty search,
//! or malformed model output all still produce a usable `(subject, html)`
//! pair. Only genuinely unexpected faults reach the per-subscription
//! boundary in [`pipeline`], where they are substituted with the error
//! digest so the dispatch stage always has something to send.

mod compose;
mod error;
mod fetch;
mod keywords;
mod pipeline;
mod rank;
mod types;

pub use compose::{compose_digest, error_digest};
pub use error::DigestError;
pub use fetch::fetch_articles;
pub use keywords::{extract_keywords, fallback_keywords};
pub use pipeline::{build_digest, run_generation, GenerationSummary, RunContext};
pub use rank::rank_articles;
pub use types::{DigestContent, DigestDraft};
