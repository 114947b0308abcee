//! Operational command line interface.
//!
//! Runs the pipeline stages on demand, outside the server's cron schedule.
//! Useful for one-off runs, backfills after an outage, and local testing.

use clap::{Parser, Subcommand};
use sqlx::PgPool;

#[derive(Debug, Parser)]
#[command(name = "pickle-cli")]
#[command(about = "Daily Pickle command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate today's digest for every active subscription.
    Generate,
    /// Send all ready-to-send digests and record the outcome.
    Dispatch,
    /// Expire stale subscriptions and delete digests past retention.
    Housekeeping,
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = pickle_core::load_app_config()?;
    let pool_config = pickle_db::PoolConfig::from_app_config(&config);
    let pool = pickle_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Generate => run_generate(&pool, &config).await?,
        Commands::Dispatch => run_dispatch(&pool, &config).await?,
        Commands::Housekeeping => run_housekeeping(&pool, &config).await?,
        Commands::Migrate => {
            pickle_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
    }

    Ok(())
}

async fn run_generate(pool: &PgPool, config: &pickle_core::AppConfig) -> anyhow::Result<()> {
    let llm = pickle_llm::CompletionClient::new(
        &config.completion_url,
        &config.completion_api_key,
        config.completion_timeout_secs,
    )?;
    let news = pickle_news::NewsClient::with_base_url(
        &config.news_api_key,
        config.news_timeout_secs,
        &config.news_base_url,
    )?;
    let ctx = pickle_digest::RunContext::new(llm, news);

    let summary = pickle_digest::run_generation(pool, &ctx).await?;
    println!(
        "generation complete: {} subscriptions, {} stored, {} degraded, {} store failures",
        summary.total_subscriptions, summary.stored, summary.degraded, summary.store_failures
    );
    Ok(())
}

async fn run_dispatch(pool: &PgPool, config: &pickle_core::AppConfig) -> anyhow::Result<()> {
    let mailer = pickle_mailer::EmailClient::with_base_url(
        &config.email_server_token,
        &config.email_from,
        config.email_timeout_secs,
        &config.email_base_url,
    )?;

    let summary = pickle_mailer::run_dispatch(pool, &mailer).await?;
    println!(
        "dispatch complete: {} digests, {} sent, {} failed",
        summary.total, summary.sent, summary.failed
    );
    Ok(())
}

async fn run_housekeeping(pool: &PgPool, config: &pickle_core::AppConfig) -> anyhow::Result<()> {
    let expired = pickle_db::expire_stale_subscriptions(pool).await?;
    let deleted = pickle_db::delete_old_digests(pool, config.digest_retention_days).await?;
    println!("housekeeping complete: {expired} subscriptions expired, {deleted} digests deleted");
    Ok(())
}
