//! # Client Error Types
//!
//! Error types for everything that talks to the backend or the token file.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ Authentication  │  │    Request      │  │     Validation          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ bad credentials │  │ non-2xx status  │  │ empty cart              │ │
//! │  │ at /login       │  │ transport error │  │ bad payment             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Decode       │  │    Config       │                              │
//! │  │                 │  │                 │                              │
//! │  │ unexpected JSON │  │ TOML / env /    │                              │
//! │  │ from backend    │  │ token file      │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ClientError` is `Clone`: the remote-state store hands one failed fetch to
//! every deduplicated caller.

use kasir_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Message used when the backend sends an error status with an empty body.
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// `/login` rejected the credentials.
    #[error("Invalid username or password")]
    AuthenticationFailed,

    /// Non-2xx response or transport failure.
    ///
    /// `status` is `None` when the request never got a response.
    #[error("{message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(#[from] CoreError),

    /// The backend answered 2xx with a body we could not decode.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// Configuration or token storage problem.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::Decode(err.to_string());
        }
        ClientError::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid URL: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Builds a `RequestFailed` from a status and the raw response body.
    ///
    /// An empty body falls back to [`GENERIC_FAILURE`].
    pub fn from_response(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            body.to_string()
        };
        ClientError::RequestFailed {
            status: Some(status),
            message,
        }
    }

    /// True for errors raised before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, ClientError::Config(_))
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
