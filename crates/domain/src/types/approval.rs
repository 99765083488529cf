//! Approval records as seen by the notification sync

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::notification::NotificationState;
use super::siae::SenderKind;
use crate::impl_domain_status_conversions;

/// The three record kinds sharing the notification shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    /// Live PASS IAE.
    Approval,
    /// PASS IAE cancelled before it ran.
    CancelledApproval,
    /// Approval imported from the provider's own legacy register.
    LegacyApproval,
}

impl_domain_status_conversions!(ApprovalKind {
    Approval => "approval",
    CancelledApproval => "cancelled_approval",
    LegacyApproval => "legacy_approval",
});

impl ApprovalKind {
    /// Processing order of the scheduler.
    pub const ALL: [Self; 3] = [Self::Approval, Self::CancelledApproval, Self::LegacyApproval];
}

/// Job seeker identity sent to the certified identity search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSeekerIdentity {
    /// Job seeker primary key.
    pub job_seeker_id: i64,
    /// First name as entered.
    pub first_name: String,
    /// Birth last name as entered.
    pub last_name: String,
    /// Birthdate.
    pub birthdate: Option<NaiveDate>,
    /// Social security number.
    pub nir: Option<String>,
    /// Provider identity id, cached after the first successful search.
    pub obfuscated_nir: Option<String>,
}

impl JobSeekerIdentity {
    /// NIR, birthdate, first and last name all present and non-blank.
    pub fn is_complete(&self) -> bool {
        let filled = |value: &str| !value.trim().is_empty();
        filled(&self.first_name)
            && filled(&self.last_name)
            && self.birthdate.is_some()
            && self.nir.as_deref().is_some_and(filled)
    }

    /// Cached provider identity id, if non-blank.
    pub fn cached_identity(&self) -> Option<&str> {
        self.obfuscated_nir.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// The accepted job application behind an approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringContext {
    /// SIRET of the hiring employer.
    pub siae_siret: String,
    /// Raw employer kind as stored by the web application.
    pub siae_kind: String,
    /// Who submitted the application.
    pub sender_kind: SenderKind,
    /// Raw prescriber organization kind, for prescriber senders.
    pub prescriber_kind: Option<String>,
}

impl HiringContext {
    /// Context of an approval issued by the provider itself.
    pub fn legacy(siae_siret: impl Into<String>, siae_kind: impl Into<String>) -> Self {
        Self {
            siae_siret: siae_siret.into(),
            siae_kind: siae_kind.into(),
            sender_kind: SenderKind::Prescriber,
            prescriber_kind: Some("PE".to_string()),
        }
    }
}

/// One approval, cancelled approval or legacy approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// Primary key within its kind.
    pub id: i64,
    /// Table the record comes from.
    pub kind: ApprovalKind,
    /// PASS IAE number.
    pub number: String,
    /// First day of validity.
    pub start_at: NaiveDate,
    /// Last day of validity.
    pub end_at: NaiveDate,
    /// Holder of the approval.
    pub job_seeker: JobSeekerIdentity,
    /// Accepted application, if any.
    pub hiring: Option<HiringContext>,
    /// Notification fields.
    #[serde(default)]
    pub notification: NotificationState,
}

impl ApprovalRecord {
    /// `dateFinPassIAE`: a cancelled approval never ran, so it ends on its
    /// start date.
    pub const fn reported_end_date(&self) -> NaiveDate {
        match self.kind {
            ApprovalKind::CancelledApproval => self.start_at,
            ApprovalKind::Approval | ApprovalKind::LegacyApproval => self.end_at,
        }
    }
}
