//! # Console Error Type
//!
//! What the operator sees when something goes wrong.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  operator types `pay 15000`                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Panel command                                                   │  │
//! │  │  ConsoleResult<()>                                               │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad syntax? ──── ConsoleError::Usage ─────────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Client error? ── ClientError::* ──────────────► Alert ────────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ! [VALIDATION] Insufficient payment: Rp 15.000 tendered, Rp 20.000 due │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Alerts never end the session; only terminal I/O failures do.

use kasir_client::ClientError;
use kasir_core::{CoreError, ValidationError};
use std::fmt;
use thiserror::Error;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Unrecognised or malformed command.
    #[error("{0}")]
    Usage(String),

    /// The logged-in role may not do this.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading stdin or writing stdout failed.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl From<ValidationError> for ConsoleError {
    fn from(err: ValidationError) -> Self {
        ConsoleError::Client(err.into())
    }
}

impl From<CoreError> for ConsoleError {
    fn from(err: CoreError) -> Self {
        ConsoleError::Client(err.into())
    }
}

impl ConsoleError {
    pub fn usage(message: impl Into<String>) -> Self {
        ConsoleError::Usage(message.into())
    }

    pub fn admin_only(action: &str) -> Self {
        ConsoleError::Forbidden(format!("Only admins can {}", action))
    }

    /// Terminal failures end the console; everything else becomes an alert.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConsoleError::Terminal(_))
    }

    pub fn alert(&self) -> Alert {
        let code = match self {
            ConsoleError::Usage(_) => AlertCode::Usage,
            ConsoleError::Forbidden(_) => AlertCode::Denied,
            ConsoleError::Terminal(_) => AlertCode::Internal,
            ConsoleError::Client(err) => match err {
                ClientError::AuthenticationFailed => AlertCode::Authentication,
                ClientError::Validation(_) => AlertCode::Validation,
                ClientError::RequestFailed { status: Some(401), .. } => AlertCode::Authentication,
                ClientError::RequestFailed { .. } => AlertCode::Request,
                ClientError::Decode(_) => AlertCode::Internal,
                ClientError::Config(_) => AlertCode::Config,
            },
        };

        let message = match self {
            ConsoleError::Client(ClientError::RequestFailed { status: Some(401), .. }) => {
                "Session expired or invalid, please log out and log in again".to_string()
            }
            other => other.to_string(),
        };

        Alert { code, message }
    }
}

// =============================================================================
// Alerts
// =============================================================================

/// Category shown in front of an alert line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCode {
    Usage,
    Validation,
    Authentication,
    Denied,
    Request,
    Config,
    Internal,
}

impl fmt::Display for AlertCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertCode::Usage => "USAGE",
            AlertCode::Validation => "VALIDATION",
            AlertCode::Authentication => "AUTH",
            AlertCode::Denied => "DENIED",
            AlertCode::Request => "FAILED",
            AlertCode::Config => "CONFIG",
            AlertCode::Internal => "ERROR",
        };
        f.write_str(label)
    }
}

/// One alert line for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub code: AlertCode,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "! [{}] {}", self.code, self.message)
    }
}
