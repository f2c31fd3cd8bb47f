//! Error taxonomy for delivery operations.
//!
//! Every network call is classified into exactly one variant; the helper
//! methods encode how the delivery pipeline reacts to each class.

use flyingevents_common::RetryPolicyError;
use reqwest::StatusCode;
use thiserror::Error;

/// Numeric code reported for failures that carry no real HTTP status.
pub const TRANSPORT_ERROR_CODE: i32 = -1;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected before any network activity
    #[error("validation failed: {0}")]
    Validation(String),

    /// The remote rejected the request (4xx); terminal, never retried
    #[error("client error ({status}): {body}")]
    Client {
        /// HTTP status of the rejection
        status: StatusCode,
        /// Raw response body
        body: String,
    },

    /// The remote failed to process the request (5xx); recoverable
    #[error("server error ({status}): {body}")]
    Server {
        /// HTTP status of the failure
        status: StatusCode,
        /// Raw response body
        body: String,
    },

    /// Connection failure, timeout, or malformed response
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Validation error for an absent or empty required parameter.
    pub fn missing_parameter(name: &str) -> Self {
        Self::Validation(format!("missing required parameter \"{name}\""))
    }

    /// Numeric error code: the HTTP status when one exists,
    /// [`TRANSPORT_ERROR_CODE`] otherwise.
    pub fn code(&self) -> i32 {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => i32::from(status.as_u16()),
            Self::Validation(_) | Self::Transport(_) => TRANSPORT_ERROR_CODE,
        }
    }

    /// Whether a failed worker send diverts the event to the failsafe
    /// endpoint. Transport faults follow the server-error path.
    pub fn routes_to_failsafe(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }

    /// Whether a failed failsafe send schedules another full delivery
    /// attempt: server errors, transport faults, and HTTP 408.
    pub fn schedules_retry(&self) -> bool {
        match self {
            Self::Server { .. } | Self::Transport(_) => true,
            Self::Client { status, .. } => *status == StatusCode::REQUEST_TIMEOUT,
            Self::Validation(_) => false,
        }
    }
}

impl From<RetryPolicyError> for ApiError {
    fn from(err: RetryPolicyError) -> Self {
        Self::Validation(err.to_string())
    }
}
