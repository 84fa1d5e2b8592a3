//! Error types for the Walhall Core client.
//!
//! The taxonomy separates failures by where they happen: token decoding
//! ([`ApiError::Claims`]), adaptor-side name resolution against an already
//! fetched lookup table ([`ApiError::UnknownName`]), upstream status codes
//! ([`ApiError::Forbidden`], [`ApiError::NotFound`], [`ApiError::Upstream`]),
//! and the network itself ([`ApiError::Transport`]). A local resolution miss
//! is deliberately distinct from an upstream 404.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the Walhall Core client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bearer token could not be decoded into claims.
    #[error("extracting claims from token: {message}")]
    Claims {
        /// What made the token undecodable.
        message: String,
    },

    /// A name failed to resolve against an already-fetched lookup table,
    /// before any upstream call for it was made.
    #[error("{name} not found")]
    UnknownName {
        /// The name that did not resolve.
        name: String,
    },

    /// Upstream rejected the request with 403.
    #[error("access to resource {entity} forbidden")]
    Forbidden {
        /// Human-readable description of what was being accessed.
        entity: String,
    },

    /// Upstream answered 404.
    #[error("resource {entity} not found")]
    NotFound {
        /// Human-readable description of what was being accessed.
        entity: String,
    },

    /// Upstream answered with any other non-success status.
    #[error("error accessing resource {entity}: upstream status {status}")]
    Upstream {
        /// Human-readable description of what was being accessed.
        entity: String,
        /// The upstream HTTP status code.
        status: u16,
    },

    /// The request never produced an upstream response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Upstream answered successfully but the body did not parse.
    #[error("decoding response from {path}: {source}")]
    Decode {
        /// Upstream path the response came from.
        path: String,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Create a claims-extraction error.
    pub fn claims(message: impl Into<String>) -> Self {
        Self::Claims {
            message: message.into(),
        }
    }

    /// Create a local name-resolution error.
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Self::UnknownName { name: name.into() }
    }

    /// Map a non-success upstream status code onto the taxonomy.
    pub fn from_status(status: StatusCode, entity: impl Into<String>) -> Self {
        let entity = entity.into();
        match status {
            StatusCode::FORBIDDEN => Self::Forbidden { entity },
            StatusCode::NOT_FOUND => Self::NotFound { entity },
            _ => Self::Upstream {
                entity,
                status: status.as_u16(),
            },
        }
    }

    /// The HTTP status the gateway should answer with for this error.
    ///
    /// Upstream, transport, and decode failures collapse to 500; their
    /// details are logged, never sent to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Claims { .. } | Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::UnknownName { .. } | Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Transport(_) | Self::Decode { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A network-level failure: DNS, connection refused, timeout imposed by the
/// operating system, or an unencodable request body. Never retried.
#[derive(Debug, Error)]
#[error("upstream transport: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}
