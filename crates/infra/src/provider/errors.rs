//! Classification of provider transport failures
//!
//! Everything that prevents reading an exit code from the provider is a
//! transport failure. Only the exit code decides between success and a
//! business rejection.

use passiae_domain::{TransportFailure, TransportFailureKind};
use reqwest::StatusCode;

/// Classify a reqwest error raised before a status could be read.
pub fn from_reqwest(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        return TransportFailure::timeout(err.to_string());
    }
    if err.is_decode() {
        return TransportFailure::malformed(err.to_string());
    }
    TransportFailure::network(err.to_string())
}

/// Classify a response whose status carries no usable body.
pub fn from_status(status: StatusCode) -> TransportFailure {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let message = format!("HTTP {} {reason}", status.as_u16());
    let kind = match status {
        StatusCode::TOO_MANY_REQUESTS => TransportFailureKind::RateLimited,
        StatusCode::UNAUTHORIZED => TransportFailureKind::Unauthorized,
        other => TransportFailureKind::HttpStatus(other.as_u16()),
    };
    TransportFailure::new(kind, message)
}

/// Statuses whose JSON body carries an exit code.
pub fn has_exit_code(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::PARTIAL_CONTENT)
}
