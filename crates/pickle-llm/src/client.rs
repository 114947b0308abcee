use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompletionParams {
    pub max_gen_len: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for CompletionParams {
    /// Low-temperature defaults favoring determinism over creativity.
    fn default() -> Self {
        Self {
            max_gen_len: 1024,
            temperature: 0.3,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_gen_len: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    generation: String,
}

/// Client for the completion service.
///
/// Manages the HTTP client, API key, and invoke URL. Use
/// [`CompletionClient::new`] with the configured endpoint, or point it at a
/// mock server in tests.
pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl CompletionClient {
    /// Creates a new client for the completion endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pickle/0.1 (daily-digest)")
            .build()?;

        Ok(Self {
            client,
            url: url.to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    /// Submits a prompt and returns the generated text, trimmed.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Http`] on network failure or a non-2xx status.
    /// - [`LlmError::Deserialize`] if the response body does not carry a
    ///   `generation` field.
    /// - [`LlmError::Api`] if the generation is empty.
    pub async fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            prompt,
            max_gen_len: params.max_gen_len,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: "completion response".to_string(),
                source: e,
            })?;

        let generation = parsed.generation.trim().to_string();
        if generation.is_empty() {
            return Err(LlmError::Api("empty generation".to_string()));
        }
        Ok(generation)
    }
}
