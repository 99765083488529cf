//! Outcome of a provider call
//!
//! Provider calls never fail with an error for expected conditions: the
//! caller always gets one of the three [`ProviderOutcome`] variants and maps
//! it to a notification status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a call to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome<T> {
    /// The provider answered with its success code.
    Success(T),
    /// The provider answered with any other exit code, stored verbatim.
    BusinessRejection(String),
    /// No usable answer: network, timeout, HTTP status, token, decoding.
    TransportFailure(TransportFailure),
}

/// Transport failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum TransportFailureKind {
    /// Connection, DNS or body transfer error.
    Network,
    /// No answer within the client timeout.
    Timeout,
    /// HTTP 429 from the provider.
    RateLimited,
    /// HTTP 401, the bearer token was refused.
    Unauthorized,
    /// Any other unexpected HTTP status.
    HttpStatus(u16),
    /// An answer without a decodable exit code.
    MalformedResponse,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network"),
            Self::Timeout => f.write_str("timeout"),
            Self::RateLimited => f.write_str("rate_limited"),
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::HttpStatus(status) => write!(f, "http_{status}"),
            Self::MalformedResponse => f.write_str("malformed_response"),
        }
    }
}

/// A provider call that produced no usable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    /// Failure category.
    pub kind: TransportFailureKind,
    /// Human readable detail, for logs only.
    pub message: String,
}

impl TransportFailure {
    /// Failure of the given kind.
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Shorthand for [`TransportFailureKind::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportFailureKind::Network, message)
    }

    /// Shorthand for [`TransportFailureKind::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportFailureKind::Timeout, message)
    }

    /// Shorthand for [`TransportFailureKind::MalformedResponse`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(TransportFailureKind::MalformedResponse, message)
    }

}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
