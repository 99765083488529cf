//! # PASS IAE Core
//!
//! Business logic of the approval notification sync - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (repositories, provider client, clock, sleeper)
//! - The eligibility precheck
//! - The per-record notifier
//! - The batch scheduler
//!
//! ## Architecture Principles
//! - Only depends on `passiae-domain`
//! - No database or HTTP code
//! - All external dependencies via traits

pub mod notification;
pub mod time;

#[cfg(feature = "test-utils")]
pub mod testing;

pub use notification::batch::{BatchOptions, BatchReport, NotificationBatch};
pub use notification::notifier::ApprovalNotifier;
pub use notification::ports::{
    ApprovalNotificationRepository, IdentitySearch, JobSeekerProfileRepository, PassIaeUpdate,
    PeApiClient,
};
pub use notification::precheck::{precheck, Readiness, ReadyContext};
pub use time::{Clock, Sleeper, SystemClock, TokioSleeper};
