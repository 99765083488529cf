//! Command line arguments

use std::time::Duration;

use clap::Parser;
use passiae_domain::constants::{DEFAULT_DELAY_SECS, MAX_DELAY_SECS};

/// Notify France Travail about PASS IAE approvals.
///
/// Without `--wet-run` the selected approvals are only logged.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "send-approvals-to-pe", version)]
pub struct Cli {
    /// Call the partner API and persist the outcomes
    #[arg(long)]
    pub wet_run: bool,

    /// Seconds to wait between two notifications
    #[arg(
        long,
        default_value_t = DEFAULT_DELAY_SECS,
        value_parser = clap::value_parser!(u64).range(0..=MAX_DELAY_SECS)
    )]
    /// Seconds to wait between two provider calls.
    pub delay: u64,
}

impl Cli {
    /// [`Self::delay`] as a duration.
    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.delay)
    }
}
