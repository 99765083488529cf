//! Domain types and models

pub mod approval;
pub mod notification;
pub mod provider;
pub mod siae;

pub use approval::{ApprovalKind, ApprovalRecord, HiringContext, JobSeekerIdentity};
pub use notification::{
    NotificationEndpoint, NotificationOutcome, NotificationState, NotificationStatus,
    PreconditionCode,
};
pub use provider::{ProviderOutcome, TransportFailure, TransportFailureKind};
pub use siae::{
    prescriber_kind_to_pe_typologie, siae_kind_to_pe_type_siae, SenderKind, SiaeKind,
    PE_TYPOLOGIE_OTHER,
};
