//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the three
//! recurring pipeline jobs: digest generation, digest dispatch, and the
//! housekeeping sweep that retires stale subscriptions and old digests.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use pickle_digest::RunContext;
use pickle_llm::CompletionClient;
use pickle_mailer::EmailClient;
use pickle_news::NewsClient;

/// Builds and starts the background job scheduler.
///
/// Registers all recurring pipeline jobs and starts the scheduler. Returns
/// the running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Fails if an outbound client cannot be constructed, a cron expression in
/// the config is invalid, or the scheduler cannot be started.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<pickle_core::AppConfig>,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let llm = CompletionClient::new(
        &config.completion_url,
        &config.completion_api_key,
        config.completion_timeout_secs,
    )?;
    let news = NewsClient::with_base_url(
        &config.news_api_key,
        config.news_timeout_secs,
        &config.news_base_url,
    )?;
    let ctx = Arc::new(RunContext::new(llm, news));

    let mailer = Arc::new(EmailClient::with_base_url(
        &config.email_server_token,
        &config.email_from,
        config.email_timeout_secs,
        &config.email_base_url,
    )?);

    register_generate_job(&scheduler, pool.clone(), Arc::clone(&config), ctx).await?;
    register_dispatch_job(&scheduler, pool.clone(), Arc::clone(&config), mailer).await?;
    register_housekeeping_job(&scheduler, pool, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the daily digest-generation job.
///
/// For every active subscription the job extracts keywords, searches recent
/// news, ranks the articles, composes the digest, and stores it as
/// `ready_to_send` for today.
async fn register_generate_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<pickle_core::AppConfig>,
    ctx: Arc<RunContext>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(config.generate_cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let ctx = Arc::clone(&ctx);

        Box::pin(async move {
            tracing::info!("scheduler: starting digest generation run");
            match pickle_digest::run_generation(&pool, &ctx).await {
                Ok(summary) => {
                    tracing::info!(
                        total = summary.total_subscriptions,
                        stored = summary.stored,
                        degraded = summary.degraded,
                        store_failures = summary.store_failures,
                        "scheduler: digest generation run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: digest generation run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the daily digest-dispatch job.
///
/// Sends every `ready_to_send` digest and records the sent/failed outcome.
async fn register_dispatch_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<pickle_core::AppConfig>,
    mailer: Arc<EmailClient>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(config.dispatch_cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let mailer = Arc::clone(&mailer);

        Box::pin(async move {
            tracing::info!("scheduler: starting digest dispatch run");
            match pickle_mailer::run_dispatch(&pool, &mailer).await {
                Ok(summary) => {
                    tracing::info!(
                        total = summary.total,
                        sent = summary.sent,
                        failed = summary.failed,
                        "scheduler: digest dispatch run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: digest dispatch run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the nightly housekeeping sweep.
///
/// Marks subscriptions past their expiry as `expired` and deletes digests
/// older than the retention window.
async fn register_housekeeping_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<pickle_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let cron = config.housekeeping_cron.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let retention_days = config.digest_retention_days;

        Box::pin(async move {
            tracing::info!("scheduler: starting housekeeping sweep");

            match pickle_db::expire_stale_subscriptions(&pool).await {
                Ok(n) if n > 0 => {
                    tracing::info!(expired = n, "scheduler: subscriptions expired");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: subscription expiry sweep failed");
                }
            }

            match pickle_db::delete_old_digests(&pool, retention_days).await {
                Ok(n) if n > 0 => {
                    tracing::info!(deleted = n, "scheduler: old digests deleted");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: digest retention sweep failed");
                }
            }

            tracing::info!("scheduler: housekeeping sweep complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
