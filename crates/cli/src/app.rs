//! Wiring of one notification run

use std::sync::Arc;

use anyhow::Context;
use passiae_core::{
    ApprovalNotificationRepository, ApprovalNotifier, BatchOptions, BatchReport, Clock,
    JobSeekerProfileRepository, NotificationBatch, PeApiClient, SystemClock, TokioSleeper,
};
use passiae_domain::Config;
use passiae_infra::database::{DbManager, SqliteApprovalRepository};
use passiae_infra::provider::PeApiHttpClient;
use tracing::info;

use crate::cli::Cli;

/// Build the adapters from `config` and execute one batch.
pub async fn run(cli: &Cli, config: &Config) -> anyhow::Result<BatchReport> {
    let db = DbManager::new(&config.database.path, config.database.pool_size)
        .with_context(|| format!("opening database {}", config.database.path))?;
    db.run_migrations().context("running database migrations")?;
    db.health_check().context("checking database")?;

    let repository = Arc::new(SqliteApprovalRepository::new(Arc::new(db)));
    let approvals: Arc<dyn ApprovalNotificationRepository> = repository.clone();
    let profiles: Arc<dyn JobSeekerProfileRepository> = repository;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let client: Arc<dyn PeApiClient> = Arc::new(
        PeApiHttpClient::from_config(&config.provider, Arc::clone(&clock))
            .context("building partner API client")?,
    );

    let notifier = ApprovalNotifier::new(client, Arc::clone(&approvals), Arc::clone(&profiles));
    let options = BatchOptions::from_config(&config.batch, cli.wet_run, cli.delay());
    info!(
        wet_run = options.wet_run,
        delay_secs = cli.delay,
        max_per_run = options.max_per_run,
        per_kind_limit = options.per_kind_limit,
        "starting notification run"
    );

    let batch =
        NotificationBatch::new(notifier, approvals, profiles, clock, Arc::new(TokioSleeper), options);
    let report = batch.run().await.context("notification run aborted")?;
    Ok(report)
}
