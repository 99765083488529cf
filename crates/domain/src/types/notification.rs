//! Notification status state machine
//!
//! Every approval record carries four notification fields: status, time,
//! endpoint and exit code. [`NotificationState`] keeps them together and
//! [`NotificationState::transition`] is the only way to move between states,
//! so the endpoint/exit code invariants hold for every persisted record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PassIaeError, Result};
use crate::impl_domain_status_conversions;

/// Notification status of an approval record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationStatus {
    /// Initial state, or waiting on a precondition.
    #[serde(rename = "notification_pending")]
    Pending,
    /// Preconditions satisfied, eligible for the next run.
    #[serde(rename = "notification_ready")]
    Ready,
    /// Provider acknowledged the approval.
    #[serde(rename = "notification_success")]
    Success,
    /// Business rejection by the provider.
    #[serde(rename = "notification_error")]
    Error,
    /// Transport failure, retried on every run.
    #[serde(rename = "notification_should_retry")]
    ShouldRetry,
}

impl_domain_status_conversions!(NotificationStatus {
    Pending => "notification_pending",
    Ready => "notification_ready",
    Success => "notification_success",
    Error => "notification_error",
    ShouldRetry => "notification_should_retry",
});

impl NotificationStatus {
    /// Records in a terminal status are never contacted again by the
    /// notifier.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Statuses picked up by the scheduler for a provider call.
    pub const fn is_selectable(self) -> bool {
        matches!(self, Self::Ready | Self::ShouldRetry)
    }
}

/// Provider operation that produced a business rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationEndpoint {
    /// Certified identity search.
    #[serde(rename = "rech_individu")]
    RechercheIndividu,
    /// PASS IAE status update.
    #[serde(rename = "maj_pass")]
    MiseAJourPass,
}

impl_domain_status_conversions!(NotificationEndpoint {
    RechercheIndividu => "rech_individu",
    MiseAJourPass => "maj_pass",
});

/// Local reason for keeping a record pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreconditionCode {
    /// NIR, birthdate, first or last name missing.
    MissingUserData,
    /// No accepted job application behind the approval.
    NoJobApplication,
    /// The approval has not started yet.
    StartsInFuture,
    /// The employer kind has no provider `typeSIAE`.
    InvalidSiaeKind,
}

impl_domain_status_conversions!(PreconditionCode {
    MissingUserData => "MISSING_USER_DATA",
    NoJobApplication => "NO_JOB_APPLICATION",
    StartsInFuture => "STARTS_IN_FUTURE",
    InvalidSiaeKind => "INVALID_SIAE_KIND",
});

/// Event applied to a [`NotificationState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// A precondition failed.
    Postponed(PreconditionCode),
    /// All preconditions hold.
    Readied,
    /// The provider accepted the status update.
    Delivered,
    /// The provider rejected the request with a business code.
    Rejected {
        /// Operation that rejected the request.
        endpoint: NotificationEndpoint,
        /// Exit code, stored verbatim.
        code: String,
    },
    /// The provider could not be reached or answered garbage.
    Deferred,
    /// An identity-search rejection became resolvable.
    Reopened,
}

/// The four notification fields of an approval record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    status: NotificationStatus,
    time: Option<DateTime<Utc>>,
    endpoint: Option<NotificationEndpoint>,
    exit_code: Option<String>,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::pending()
    }
}

impl NotificationState {
    /// Fresh record, never evaluated.
    pub const fn pending() -> Self {
        Self { status: NotificationStatus::Pending, time: None, endpoint: None, exit_code: None }
    }

    /// Rebuild a state from persisted columns, validating the field
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PassIaeError::InvalidInput`] when an endpoint is stored
    /// outside the error status, or an exit code outside the pending and
    /// error statuses, or a pending exit code is not a precondition code.
    pub fn from_parts(
        status: NotificationStatus,
        time: Option<DateTime<Utc>>,
        endpoint: Option<NotificationEndpoint>,
        exit_code: Option<String>,
    ) -> Result<Self> {
        if endpoint.is_some() && status != NotificationStatus::Error {
            return Err(PassIaeError::InvalidInput(format!(
                "endpoint set on a {status} notification"
            )));
        }
        match (&exit_code, status) {
            (None, _) | (Some(_), NotificationStatus::Error) => {}
            (Some(code), NotificationStatus::Pending) => {
                code.parse::<PreconditionCode>().map_err(PassIaeError::InvalidInput)?;
            }
            (Some(code), other) => {
                return Err(PassIaeError::InvalidInput(format!(
                    "exit code {code} set on a {other} notification"
                )));
            }
        }
        Ok(Self { status, time, endpoint, exit_code })
    }

    /// Current status.
    pub const fn status(&self) -> NotificationStatus {
        self.status
    }

    /// When the status was last written; `None` for a fresh record.
    pub const fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Provider operation behind an error status.
    pub const fn endpoint(&self) -> Option<NotificationEndpoint> {
        self.endpoint
    }

    /// Provider exit code of an error, or precondition code of a pending record.
    pub fn exit_code(&self) -> Option<&str> {
        self.exit_code.as_deref()
    }

    /// The precondition code of a pending record, if any.
    pub fn precondition(&self) -> Option<PreconditionCode> {
        match self.status {
            NotificationStatus::Pending => self.exit_code.as_deref()?.parse().ok(),
            _ => None,
        }
    }

    /// Identity-search rejections (or errors with no recorded endpoint) may
    /// become resolvable once the identity cache is filled.
    pub fn is_reopenable(&self) -> bool {
        self.status == NotificationStatus::Error
            && matches!(self.endpoint, None | Some(NotificationEndpoint::RechercheIndividu))
    }

    /// Apply `outcome` at time `at`.
    ///
    /// # Errors
    ///
    /// Returns [`PassIaeError::InvalidTransition`] when the outcome is not
    /// legal from the current status. `Success` has no outgoing transition
    /// and status-update errors are permanent.
    pub fn transition(&self, outcome: NotificationOutcome, at: DateTime<Utc>) -> Result<Self> {
        use NotificationStatus::{Error, Pending, Ready, ShouldRetry};

        let next = match (self.status, outcome) {
            (Pending | Ready | ShouldRetry, NotificationOutcome::Postponed(code)) => Self {
                status: Pending,
                time: Some(at),
                endpoint: None,
                exit_code: Some(code.to_string()),
            },
            (Pending, NotificationOutcome::Readied) => {
                Self { status: Ready, time: Some(at), endpoint: None, exit_code: None }
            }
            (Ready | ShouldRetry, NotificationOutcome::Delivered) => Self {
                status: NotificationStatus::Success,
                time: Some(at),
                endpoint: None,
                exit_code: None,
            },
            (Ready | ShouldRetry, NotificationOutcome::Rejected { endpoint, code }) => {
                Self { status: Error, time: Some(at), endpoint: Some(endpoint), exit_code: Some(code) }
            }
            (Ready | ShouldRetry, NotificationOutcome::Deferred) => {
                Self { status: ShouldRetry, time: Some(at), endpoint: None, exit_code: None }
            }
            (Error, NotificationOutcome::Reopened) if self.is_reopenable() => {
                Self { status: Pending, time: Some(at), endpoint: None, exit_code: None }
            }
            (status, outcome) => {
                return Err(PassIaeError::InvalidTransition(format!(
                    "{outcome:?} is not allowed from {status}"
                )));
            }
        };
        Ok(next)
    }
}
