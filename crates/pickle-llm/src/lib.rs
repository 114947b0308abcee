//! HTTP client for the text-completion collaborator.
//!
//! The service speaks a minimal completion protocol: a prompt plus sampling
//! parameters in, a single generated string out. Both digest-pipeline uses
//! (keyword extraction and digest synthesis) go through [`CompletionClient`].

mod client;
mod error;

pub use client::{CompletionClient, CompletionParams};
pub use error::LlmError;
