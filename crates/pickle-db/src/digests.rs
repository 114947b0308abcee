//! Database operations for the `digests` table.
//!
//! A digest is keyed by `(email, digest_date)` everywhere: the generator's
//! upsert and both dispatch status transitions use the same composite key.

use chrono::{DateTime, NaiveDate, Utc};
use pickle_core::DigestStatus;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `digests` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestRow {
    pub email: String,
    pub digest_date: NaiveDate,
    pub topic: String,
    pub subject_line: String,
    pub html_content: String,
    pub article_count: i32,
    pub status: String,
    pub generated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// Fields written by the generator for one subscription's daily digest.
#[derive(Debug, Clone)]
pub struct NewDigest {
    pub email: String,
    pub digest_date: NaiveDate,
    pub topic: String,
    pub subject_line: String,
    pub html_content: String,
    pub article_count: i32,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert or overwrite today's digest for `(email, digest_date)`.
///
/// A re-run of the generator replaces the previous record wholesale and
/// resets it to `ready_to_send`, clearing any prior sent/failed marks.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_digest(pool: &PgPool, digest: &NewDigest) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO digests \
             (email, digest_date, topic, subject_line, html_content, article_count, \
              status, generated_at, sent_at, failed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, now(), NULL, NULL) \
         ON CONFLICT (email, digest_date) DO UPDATE \
             SET topic = EXCLUDED.topic, \
                 subject_line = EXCLUDED.subject_line, \
                 html_content = EXCLUDED.html_content, \
                 article_count = EXCLUDED.article_count, \
                 status = EXCLUDED.status, \
                 generated_at = now(), \
                 sent_at = NULL, \
                 failed_at = NULL",
    )
    .bind(&digest.email)
    .bind(digest.digest_date)
    .bind(&digest.topic)
    .bind(&digest.subject_line)
    .bind(&digest.html_content)
    .bind(digest.article_count)
    .bind(DigestStatus::ReadyToSend.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// List all digests awaiting dispatch, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ready_digests(pool: &PgPool) -> Result<Vec<DigestRow>, DbError> {
    let rows = sqlx::query_as::<_, DigestRow>(
        "SELECT email, digest_date, topic, subject_line, html_content, article_count, \
                status, generated_at, sent_at, failed_at \
         FROM digests \
         WHERE status = $1 \
         ORDER BY digest_date, email",
    )
    .bind(DigestStatus::ReadyToSend.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Transition a digest to `sent` and stamp `sent_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches the key, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_digest_sent(
    pool: &PgPool,
    email: &str,
    digest_date: NaiveDate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE digests \
         SET status = $1, sent_at = now() \
         WHERE email = $2 AND digest_date = $3",
    )
    .bind(DigestStatus::Sent.as_str())
    .bind(email)
    .bind(digest_date)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Transition a digest to `failed` and stamp `failed_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches the key, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_digest_failed(
    pool: &PgPool,
    email: &str,
    digest_date: NaiveDate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE digests \
         SET status = $1, failed_at = now() \
         WHERE email = $2 AND digest_date = $3",
    )
    .bind(DigestStatus::Failed.as_str())
    .bind(email)
    .bind(digest_date)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Delete digests older than `retention_days`, returning the rows removed.
///
/// Sent and failed records alike are pruned once past retention.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_old_digests(pool: &PgPool, retention_days: i64) -> Result<u64, DbError> {
    let result = sqlx::query(
        "DELETE FROM digests \
         WHERE digest_date < current_date - $1::int",
    )
    .bind(i32::try_from(retention_days).unwrap_or(i32::MAX))
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
