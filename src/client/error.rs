//! Error types for the Landscape API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by [`Client`](super::Client) calls and payload accessors.
///
/// HTTP error statuses are not represented: a 400 or 404 is a normal
/// response the caller inspects, not an error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS or timeout failure reported by the HTTP transport.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body could not be decoded into the typed payload for its
    /// status. The status and raw body are kept for diagnostics.
    #[error("Failed to decode HTTP {status} response body")]
    Decode {
        status: StatusCode,
        body: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be interpreted as the requested variant.
    #[error("Payload is not a valid {expected}")]
    Variant {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Client-local validation failure, caught before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Raw response body attached to a decode failure, if any.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            ClientError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status attached to a decode failure, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}
