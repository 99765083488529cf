//! Batch scheduler
//!
//! One run reopens resolvable identity errors, promotes pending records
//! whose preconditions now hold, then notifies a bounded selection of ready
//! and retryable records, one at a time with a fixed pause in between.

use std::sync::Arc;
use std::time::Duration;

use passiae_domain::constants::{DEFAULT_DELAY_SECS, DEFAULT_MAX_PER_RUN};
use passiae_domain::{
    ApprovalKind, ApprovalRecord, BatchConfig, NotificationOutcome, NotificationStatus, Result,
};
use serde::Serialize;
use tracing::{error, info, instrument};

use super::notifier::ApprovalNotifier;
use super::ports::{ApprovalNotificationRepository, JobSeekerProfileRepository};
use super::precheck::{precheck, Readiness};
use crate::time::{Clock, Sleeper};

/// Scheduler settings for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Attempts shared by all kinds.
    pub max_per_run: usize,
    /// Attempts allowed per kind.
    pub per_kind_limit: usize,
    /// Call the provider; otherwise only log the selection.
    pub wet_run: bool,
    /// Pause between two consecutive attempts.
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_per_run: DEFAULT_MAX_PER_RUN,
            per_kind_limit: DEFAULT_MAX_PER_RUN,
            wet_run: false,
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
        }
    }
}

impl BatchOptions {
    /// Options from the configured budget and command-line flags.
    pub fn from_config(config: &BatchConfig, wet_run: bool, delay: Duration) -> Self {
        Self {
            max_per_run: config.max_per_run,
            per_kind_limit: config.per_kind_limit(),
            wet_run,
            delay,
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Whether the provider was called.
    pub wet_run: bool,
    /// Error records moved back to pending.
    pub reopened: usize,
    /// Pending records promoted to ready.
    pub promoted: usize,
    /// Records selected for a provider call.
    pub selected: usize,
    /// Records actually notified (zero on a dry run).
    pub attempted: usize,
    /// Attempts that ended in success.
    pub success: usize,
    /// Attempts that ended in a business rejection.
    pub errors: usize,
    /// Attempts that ended in a transport failure.
    pub retries: usize,
    /// Attempts stopped by a precondition.
    pub pending: usize,
    /// Every attempt of a full budget failed.
    pub saturated: bool,
}

/// Runs the periodic notification batch
pub struct NotificationBatch {
    notifier: ApprovalNotifier,
    approvals: Arc<dyn ApprovalNotificationRepository>,
    profiles: Arc<dyn JobSeekerProfileRepository>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    options: BatchOptions,
}

impl NotificationBatch {
    /// Scheduler running `notifier` over the repositories' records.
    pub fn new(
        notifier: ApprovalNotifier,
        approvals: Arc<dyn ApprovalNotificationRepository>,
        profiles: Arc<dyn JobSeekerProfileRepository>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
        options: BatchOptions,
    ) -> Self {
        Self { notifier, approvals, profiles, clock, sleeper, options }
    }

    /// Execute one run.
    ///
    /// # Errors
    ///
    /// Any repository failure aborts the run; records already processed keep
    /// their new state.
    #[instrument(skip(self), fields(wet_run = self.options.wet_run))]
    pub async fn run(&self) -> Result<BatchReport> {
        let mut report = BatchReport { wet_run: self.options.wet_run, ..BatchReport::default() };

        report.reopened = self.reopen_resolvable_errors().await?;
        report.promoted = self.promote_pending().await?;

        let selection = self.select().await?;
        report.selected = selection.len();
        info!(
            selected = report.selected,
            reopened = report.reopened,
            promoted = report.promoted,
            "selected approvals for notification"
        );

        if !self.options.wet_run {
            for record in &selection {
                info!(
                    approval = %record.number,
                    kind = %record.kind,
                    status = %record.notification.status(),
                    "dry run: would notify"
                );
            }
            return Ok(report);
        }

        for (index, record) in selection.iter().enumerate() {
            if index > 0 {
                self.sleeper.sleep(self.options.delay).await;
            }
            let state = self.notifier.notify(record, self.clock.now()).await?;
            report.attempted += 1;
            match state.status() {
                NotificationStatus::Success => report.success += 1,
                NotificationStatus::Error => report.errors += 1,
                NotificationStatus::ShouldRetry => report.retries += 1,
                NotificationStatus::Pending | NotificationStatus::Ready => report.pending += 1,
            }
        }

        let failures = report.errors + report.retries;
        if self.options.max_per_run > 0 && failures == self.options.max_per_run {
            report.saturated = true;
            error!(
                failures,
                max_per_run = self.options.max_per_run,
                "every notification of a full batch failed, later records are starved"
            );
        }

        info!(
            attempted = report.attempted,
            success = report.success,
            errors = report.errors,
            retries = report.retries,
            pending = report.pending,
            "notification batch finished"
        );
        Ok(report)
    }

    async fn reopen_resolvable_errors(&self) -> Result<usize> {
        let mut reopened = 0;
        for kind in ApprovalKind::ALL {
            let records =
                self.approvals.find_by_status(kind, &[NotificationStatus::Error], None).await?;
            for record in records {
                if !record.notification.is_reopenable() || !self.has_cached_identity(&record).await? {
                    continue;
                }
                let next =
                    record.notification.transition(NotificationOutcome::Reopened, self.clock.now())?;
                self.approvals.save_notification(kind, record.id, &next).await?;
                info!(approval = %record.number, kind = %kind, "identity now known, reopened");
                reopened += 1;
            }
        }
        Ok(reopened)
    }

    async fn has_cached_identity(&self, record: &ApprovalRecord) -> Result<bool> {
        if record.job_seeker.cached_identity().is_some() {
            return Ok(true);
        }
        let cached = self.profiles.cached_identity(record.job_seeker.job_seeker_id).await?;
        Ok(cached.is_some_and(|id| !id.trim().is_empty()))
    }

    async fn promote_pending(&self) -> Result<usize> {
        let today = self.clock.today();
        let mut promoted = 0;
        for kind in ApprovalKind::ALL {
            let records =
                self.approvals.find_by_status(kind, &[NotificationStatus::Pending], None).await?;
            for record in records {
                let outcome = match precheck(&record, today) {
                    Readiness::Ready(_) => NotificationOutcome::Readied,
                    Readiness::NotReady(code) if record.notification.precondition() != Some(code) => {
                        NotificationOutcome::Postponed(code)
                    }
                    Readiness::NotReady(_) => continue,
                };
                let readied = outcome == NotificationOutcome::Readied;
                let next = record.notification.transition(outcome, self.clock.now())?;
                self.approvals.save_notification(kind, record.id, &next).await?;
                if readied {
                    promoted += 1;
                }
            }
        }
        Ok(promoted)
    }

    async fn select(&self) -> Result<Vec<ApprovalRecord>> {
        let statuses = [NotificationStatus::Ready, NotificationStatus::ShouldRetry];
        let mut selection = Vec::new();
        for kind in ApprovalKind::ALL {
            let remaining = self.options.max_per_run.saturating_sub(selection.len());
            if remaining == 0 {
                break;
            }
            let limit = self.options.per_kind_limit.min(remaining);
            let records = self.approvals.find_by_status(kind, &statuses, Some(limit)).await?;
            selection.extend(records.into_iter().take(limit));
        }
        Ok(selection)
    }
}
