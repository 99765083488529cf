//! Eligibility precheck
//!
//! Local checks run before any provider call. The first failing check wins.

use chrono::NaiveDate;
use passiae_domain::{
    prescriber_kind_to_pe_typologie, siae_kind_to_pe_type_siae, ApprovalRecord, PreconditionCode,
    SenderKind,
};

/// Provider fields derived from the hiring context of a ready record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyContext {
    /// `typeSIAE` of the employer.
    pub type_siae: u16,
    /// SIRET of the employer.
    pub siret: String,
    /// `origineCandidature` of the sender.
    pub origine_candidature: &'static str,
    /// `typologiePrescripteur`, prescriber senders only.
    pub typologie_prescripteur: Option<String>,
}

/// Precheck verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Every precondition holds.
    Ready(ReadyContext),
    /// The first precondition that failed.
    NotReady(PreconditionCode),
}

impl Readiness {
    /// `true` for [`Readiness::Ready`].
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Decide whether `record` can be sent to the provider on `today`.
pub fn precheck(record: &ApprovalRecord, today: NaiveDate) -> Readiness {
    if !record.job_seeker.is_complete() {
        return Readiness::NotReady(PreconditionCode::MissingUserData);
    }

    let Some(hiring) = record.hiring.as_ref() else {
        return Readiness::NotReady(PreconditionCode::NoJobApplication);
    };

    if record.start_at > today {
        return Readiness::NotReady(PreconditionCode::StartsInFuture);
    }

    let Some(type_siae) = siae_kind_to_pe_type_siae(&hiring.siae_kind) else {
        return Readiness::NotReady(PreconditionCode::InvalidSiaeKind);
    };

    let typologie_prescripteur = match hiring.sender_kind {
        SenderKind::Prescriber => {
            hiring.prescriber_kind.as_deref().map(prescriber_kind_to_pe_typologie)
        }
        SenderKind::JobSeeker | SenderKind::Employer => None,
    };

    Readiness::Ready(ReadyContext {
        type_siae,
        siret: hiring.siae_siret.clone(),
        origine_candidature: hiring.sender_kind.pe_origine_candidature(),
        typologie_prescripteur,
    })
}
