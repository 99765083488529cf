//! Per-record notification
//!
//! One call moves one approval record through precheck, identity search and
//! status update, then persists the resulting notification fields in a
//! single write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use passiae_domain::{
    ApprovalRecord, NotificationEndpoint, NotificationOutcome, NotificationState,
    NotificationStatus, ProviderOutcome, Result,
};
use tracing::{debug, info, instrument, warn};

use super::ports::{
    ApprovalNotificationRepository, IdentitySearch, JobSeekerProfileRepository, PassIaeUpdate,
    PeApiClient,
};
use super::precheck::{precheck, Readiness, ReadyContext};

/// Notifies the provider about one approval at a time
pub struct ApprovalNotifier {
    client: Arc<dyn PeApiClient>,
    approvals: Arc<dyn ApprovalNotificationRepository>,
    profiles: Arc<dyn JobSeekerProfileRepository>,
}

impl ApprovalNotifier {
    /// Notifier writing through the given repositories.
    pub fn new(
        client: Arc<dyn PeApiClient>,
        approvals: Arc<dyn ApprovalNotificationRepository>,
        profiles: Arc<dyn JobSeekerProfileRepository>,
    ) -> Self {
        Self { client, approvals, profiles }
    }

    /// Notify the provider about `record` and persist the outcome.
    ///
    /// Terminal records are returned unchanged without any call or write.
    ///
    /// # Errors
    ///
    /// Repository failures and illegal transitions. Provider failures are
    /// never errors: they end up in the returned state.
    #[instrument(skip(self, record), fields(approval = %record.number, kind = %record.kind))]
    pub async fn notify(
        &self,
        record: &ApprovalRecord,
        at: DateTime<Utc>,
    ) -> Result<NotificationState> {
        let current = &record.notification;
        if current.status().is_terminal() {
            debug!(status = %current.status(), "record already settled, skipping");
            return Ok(current.clone());
        }

        let outcome = match precheck(record, at.date_naive()) {
            Readiness::NotReady(code) => {
                info!(code = %code, "precondition not met, keeping record pending");
                NotificationOutcome::Postponed(code)
            }
            Readiness::Ready(context) => self.call_provider(record, &context, at).await?,
        };

        let from = match (current.status(), &outcome) {
            (NotificationStatus::Pending, NotificationOutcome::Postponed(_)) => current.clone(),
            (NotificationStatus::Pending, _) => {
                current.transition(NotificationOutcome::Readied, at)?
            }
            _ => current.clone(),
        };
        let next = from.transition(outcome, at)?;

        self.approvals.save_notification(record.kind, record.id, &next).await?;
        Ok(next)
    }

    async fn call_provider(
        &self,
        record: &ApprovalRecord,
        context: &ReadyContext,
        at: DateTime<Utc>,
    ) -> Result<NotificationOutcome> {
        let id_national = match self.resolve_identity(record, at).await? {
            Ok(id) => id,
            Err(outcome) => return Ok(outcome),
        };

        let update = PassIaeUpdate {
            number: record.number.clone(),
            start_at: record.start_at,
            end_at: record.reported_end_date(),
            id_national,
            siret: context.siret.clone(),
            type_siae: context.type_siae,
            origine_candidature: context.origine_candidature.to_string(),
            typologie_prescripteur: context.typologie_prescripteur.clone(),
        };

        let outcome = match self.client.mise_a_jour_pass_iae(&update).await? {
            ProviderOutcome::Success(()) => {
                info!("status update accepted");
                NotificationOutcome::Delivered
            }
            ProviderOutcome::BusinessRejection(code) => {
                warn!(code = %code, "status update rejected");
                NotificationOutcome::Rejected { endpoint: NotificationEndpoint::MiseAJourPass, code }
            }
            ProviderOutcome::TransportFailure(failure) => {
                warn!(failure = %failure, "status update failed, will retry");
                NotificationOutcome::Deferred
            }
        };
        Ok(outcome)
    }

    /// Cached identity id, or a fresh certified search.
    ///
    /// The inner `Err` carries the outcome that ends the notification.
    async fn resolve_identity(
        &self,
        record: &ApprovalRecord,
        at: DateTime<Utc>,
    ) -> Result<std::result::Result<String, NotificationOutcome>> {
        let job_seeker = &record.job_seeker;
        if let Some(id) = job_seeker.cached_identity() {
            return Ok(Ok(id.to_string()));
        }
        if let Some(id) = self.profiles.cached_identity(job_seeker.job_seeker_id).await? {
            if !id.trim().is_empty() {
                return Ok(Ok(id));
            }
        }

        let (Some(birthdate), Some(nir)) = (job_seeker.birthdate, job_seeker.nir.clone()) else {
            return Ok(Err(NotificationOutcome::Postponed(
                passiae_domain::PreconditionCode::MissingUserData,
            )));
        };
        let search = IdentitySearch {
            first_name: job_seeker.first_name.clone(),
            last_name: job_seeker.last_name.clone(),
            birthdate,
            nir,
        };

        match self.client.recherche_individu_certifie(&search).await? {
            ProviderOutcome::Success(id) => {
                debug!(job_seeker = job_seeker.job_seeker_id, "identity certified");
                self.profiles.store_identity(job_seeker.job_seeker_id, &id, at).await?;
                Ok(Ok(id))
            }
            ProviderOutcome::BusinessRejection(code) => {
                warn!(code = %code, "identity search rejected");
                Ok(Err(NotificationOutcome::Rejected {
                    endpoint: NotificationEndpoint::RechercheIndividu,
                    code,
                }))
            }
            ProviderOutcome::TransportFailure(failure) => {
                warn!(failure = %failure, "identity search failed, will retry");
                Ok(Err(NotificationOutcome::Deferred))
            }
        }
    }
}
