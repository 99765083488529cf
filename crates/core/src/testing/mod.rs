//! Test doubles for the notification ports
//!
//! Enabled with the `test-utils` feature. Shared by the unit and
//! integration tests of this crate and by the infrastructure tests.

// Test utilities: panic on poisoned mutexes to fail tests early
#![allow(clippy::expect_used)]

pub mod client;
pub mod repositories;
pub mod time;

pub use client::{ProviderCall, ScriptedPeApiClient};
pub use repositories::InMemoryApprovalStore;
pub use time::{MockClock, RecordingSleeper};
