//! # PASS IAE Domain
//!
//! Business domain types for the PASS IAE notification sync.
//!
//! This crate contains:
//! - Approval records and the notification status state machine
//! - Provider outcome types and provider code mappings
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Name normalisation for the certified identity search
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use types::*;
