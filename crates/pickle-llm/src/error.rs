use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API error: {0}")]
    Api(String),

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        source: serde_json::Error,
    },
}
