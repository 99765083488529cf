//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the PASS IAE sync
///
/// Expected provider outcomes (business rejections, transport failures) are
/// not errors: they travel as [`crate::ProviderOutcome`] values and end up as
/// notification statuses. This type is reserved for faults that must abort
/// the current operation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PassIaeError {
    /// SQLite or pool failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client failure outside a provider call.
    #[error("Network error: {0}")]
    Network(String),

    /// Credential exchange refused.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The record or profile does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored or supplied value is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The notification state machine refused an outcome.
    #[error("Invalid notification transition: {0}")]
    InvalidTransition(String),

    /// Anything else, such as a panicked blocking task.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for PASS IAE sync operations
pub type Result<T> = std::result::Result<T, PassIaeError>;
