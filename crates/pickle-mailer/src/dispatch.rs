//! The dispatch stage: transmit ready digests and record the outcome.

use sqlx::PgPool;

use crate::client::EmailClient;
use crate::error::MailError;

/// Outcome counters for one dispatch run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Send every `ready_to_send` digest and mark each `sent` or `failed`.
///
/// Per-digest failures are isolated: a send error marks that digest
/// `failed` and moves on. Status-write failures never abort the run —
/// a failed "mark as failed" is a best-effort write logged as a
/// diagnostic, and a failed "mark as sent" is logged at `error` because
/// the digest may be re-sent on the next run.
///
/// # Errors
///
/// Returns [`MailError::Db`] only if the ready list cannot be read at all.
pub async fn run_dispatch(
    pool: &PgPool,
    client: &EmailClient,
) -> Result<DispatchSummary, MailError> {
    let digests = pickle_db::list_ready_digests(pool).await?;

    tracing::info!(count = digests.len(), "starting digest dispatch run");

    let mut summary = DispatchSummary {
        total: digests.len(),
        ..DispatchSummary::default()
    };

    for digest in &digests {
        match client
            .send(&digest.email, &digest.subject_line, &digest.html_content)
            .await
        {
            Ok(message_id) => {
                summary.sent += 1;
                tracing::info!(email = %digest.email, message_id = %message_id, "digest sent");

                if let Err(e) =
                    pickle_db::mark_digest_sent(pool, &digest.email, digest.digest_date).await
                {
                    tracing::error!(
                        email = %digest.email,
                        error = %e,
                        "digest sent but sent-mark failed; it may be re-sent next run"
                    );
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(email = %digest.email, error = %e, "digest send failed");

                if let Err(mark_err) =
                    pickle_db::mark_digest_failed(pool, &digest.email, digest.digest_date).await
                {
                    // Best-effort write: a missed failure mark only delays
                    // the retry accounting, it must not stop the run.
                    tracing::warn!(
                        email = %digest.email,
                        error = %mark_err,
                        "diagnostic: failed-mark write did not apply"
                    );
                }
            }
        }
    }

    tracing::info!(
        total = summary.total,
        sent = summary.sent,
        failed = summary.failed,
        "digest dispatch run complete"
    );

    Ok(summary)
}
