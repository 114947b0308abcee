use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email API error: {0}")]
    Api(String),

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Db(#[from] pickle_db::DbError),
}
