//! `send-approvals-to-pe`: periodic PASS IAE notification run.

mod app;
mod cli;

use anyhow::Context;
use clap::Parser;
use passiae_infra::config;
use passiae_infra::observability::{init_tracing, LogFormat};
use tracing::{error, info};

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine: variables may come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing(LogFormat::from_env()).context("initialising logging")?;

    let config = config::load().context("loading configuration")?;
    let report = match app::run(&cli, &config).await {
        Ok(report) => report,
        Err(err) => {
            error!(error = ?err, "notification run failed");
            return Err(err);
        }
    };

    info!(report = %serde_json::to_string(&report)?, "notification run complete");
    Ok(())
}
