//! Database operations for the `subscriptions` table.

use chrono::{DateTime, Duration, Utc};
use pickle_core::SubscriptionStatus;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub email: String,
    pub topic: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert or renew a subscription, keyed by email.
///
/// A repeat subscribe replaces the topic, reactivates an expired
/// subscription, and pushes `expires_at` out by `ttl_days` from now.
/// `created_at` is preserved on renewal.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_subscription(
    pool: &PgPool,
    email: &str,
    topic: &str,
    ttl_days: i64,
) -> Result<(), DbError> {
    let expires_at = Utc::now() + Duration::days(ttl_days);

    sqlx::query(
        "INSERT INTO subscriptions (email, topic, status, expires_at) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (email) DO UPDATE \
             SET topic = EXCLUDED.topic, \
                 status = EXCLUDED.status, \
                 expires_at = EXCLUDED.expires_at",
    )
    .bind(email)
    .bind(topic)
    .bind(SubscriptionStatus::Active.as_str())
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all subscriptions with status `active`, ordered by email.
///
/// The digest generator iterates this list once per run; it never writes
/// back to the table.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_subscriptions(pool: &PgPool) -> Result<Vec<SubscriptionRow>, DbError> {
    let rows = sqlx::query_as::<_, SubscriptionRow>(
        "SELECT email, topic, status, created_at, expires_at \
         FROM subscriptions \
         WHERE status = $1 \
         ORDER BY email",
    )
    .bind(SubscriptionStatus::Active.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Flip subscriptions past their `expires_at` to `expired`.
///
/// Returns the number of rows updated. Run by the housekeeping job; there
/// is no row-level TTL in Postgres so expiry is an explicit sweep.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn expire_stale_subscriptions(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE subscriptions \
         SET status = $1 \
         WHERE status = $2 AND expires_at < now()",
    )
    .bind(SubscriptionStatus::Expired.as_str())
    .bind(SubscriptionStatus::Active.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
