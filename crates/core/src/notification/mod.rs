//! Approval notification sync with the France Travail partner API

pub mod batch;
pub mod notifier;
pub mod ports;
pub mod precheck;
