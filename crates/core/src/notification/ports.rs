//! Port interfaces for the notification sync

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use passiae_domain::{
    ApprovalKind, ApprovalRecord, JobSeekerIdentity, NotificationState, NotificationStatus,
    ProviderOutcome, Result,
};
use serde::{Deserialize, Serialize};

/// Storage of approval records and their notification fields
#[async_trait]
pub trait ApprovalNotificationRepository: Send + Sync {
    /// Records of `kind` whose status is one of `statuses`, most recent
    /// `start_at` first, at most `limit` when given.
    async fn find_by_status(
        &self,
        kind: ApprovalKind,
        statuses: &[NotificationStatus],
        limit: Option<usize>,
    ) -> Result<Vec<ApprovalRecord>>;

    /// Persist the four notification fields of one record in a single write.
    async fn save_notification(
        &self,
        kind: ApprovalKind,
        id: i64,
        state: &NotificationState,
    ) -> Result<()>;
}

/// Identity cache on the job seeker profile
#[async_trait]
pub trait JobSeekerProfileRepository: Send + Sync {
    /// Cached provider identity id, if any.
    async fn cached_identity(&self, job_seeker_id: i64) -> Result<Option<String>>;

    /// Store the provider identity id and the certification attempt time.
    async fn store_identity(
        &self,
        job_seeker_id: i64,
        obfuscated_nir: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Replace the civil identity of a job seeker.
    ///
    /// Any change to the name, birthdate or NIR clears the cached provider
    /// identity, which then has to be certified again. Returns whether the
    /// cache was cleared.
    async fn update_identity(&self, identity: &JobSeekerIdentity) -> Result<bool>;
}

/// Certified identity search request, before provider formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySearch {
    /// First name, formatted by the adapter.
    pub first_name: String,
    /// Birth last name, formatted by the adapter.
    pub last_name: String,
    /// Birthdate.
    pub birthdate: NaiveDate,
    /// Full NIR; the adapter truncates it.
    pub nir: String,
}

/// PASS IAE status update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassIaeUpdate {
    /// PASS IAE number.
    pub number: String,
    /// First day of validity.
    pub start_at: NaiveDate,
    /// Last day of validity.
    pub end_at: NaiveDate,
    /// Provider identity id of the job seeker.
    pub id_national: String,
    /// SIRET of the employer.
    pub siret: String,
    /// `typeSIAE` of the employer.
    pub type_siae: u16,
    /// `origineCandidature` of the sender.
    pub origine_candidature: String,
    /// `typologiePrescripteur`, prescriber senders only.
    pub typologie_prescripteur: Option<String>,
}

/// France Travail partner API
///
/// Expected failures are reported through [`ProviderOutcome`]; `Err` is
/// reserved for faults that must stop the run.
#[async_trait]
pub trait PeApiClient: Send + Sync {
    /// Returns the provider identity id (`idNationalDE`) on success.
    async fn recherche_individu_certifie(
        &self,
        search: &IdentitySearch,
    ) -> Result<ProviderOutcome<String>>;

    async fn mise_a_jour_pass_iae(&self, update: &PassIaeUpdate) -> Result<ProviderOutcome<()>>;
}
