//! Outcome types for upstream delivery.

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;

/// Fallback error description used when no attempt recorded one.
pub const RPC_UNAVAILABLE: &str = "rpc unavailable";

/// A completed upstream response, relayed to the caller as-is.
///
/// Any HTTP response from an upstream counts as completed, error statuses
/// included; the relay never reinterprets upstream status codes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    /// Upstream status code, relayed verbatim.
    pub status: StatusCode,

    /// Upstream `Content-Type`, if it sent one. Some public RPCs return HTML
    /// error pages; the body is opaque to the relay either way.
    pub content_type: Option<HeaderValue>,

    /// Upstream body, relayed byte-for-byte.
    pub body: Bytes,
}

/// Failure of a single delivery attempt.
///
/// These are the only error kinds that propagate; they are absorbed during
/// fallback iteration and surface only when every target fails.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The attempt timer fired before the upstream responded. The in-flight
    /// call is abandoned, not cancelled at the transport level.
    #[error("timeout")]
    Timeout,

    /// The call failed before producing a response (DNS, connect, reset).
    #[error("{0}")]
    Transport(String),
}

/// Failure of a whole forward operation: no target in the active sequence
/// produced an HTTP response.
#[derive(Debug, Error, PartialEq)]
pub enum ForwardError {
    /// Carries the most recent attempt's failure description.
    #[error("{last}")]
    AllFailed { last: String },
}

impl ForwardError {
    pub(crate) fn from_last(last: Option<DeliveryError>) -> Self {
        ForwardError::AllFailed {
            last: last
                .map(|e| e.to_string())
                .unwrap_or_else(|| RPC_UNAVAILABLE.to_string()),
        }
    }
}
