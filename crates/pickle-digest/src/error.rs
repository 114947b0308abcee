use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("ranking error: {0}")]
    Ranking(String),

    #[error(transparent)]
    Db(#[from] pickle_db::DbError),
}
