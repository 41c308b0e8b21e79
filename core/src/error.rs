//! Networking error taxonomy.
//!
//! # Design
//! Every failure the dispatcher can produce lands in one of seven
//! `NetworkingError` kinds. Each kind has a stable numeric code plus two
//! strings: a user-facing description meant for display and a developer-facing
//! failure reason (also the `Display` output) meant for logs. Payloads carry
//! only what those two strings need.

use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportError;

/// Domain attached to every `ErrorReport`.
pub const ERROR_DOMAIN: &str = "webservice.networking";

const DEFAULT_DESCRIPTION: &str = "An error occurred";

/// Classified outcome of a failed `WebService` call.
#[derive(Debug, Clone, Error)]
pub enum NetworkingError {
    /// Anything that does not fit another kind, with an optional reason.
    #[error("{}", .0.as_deref().unwrap_or("Unknown error"))]
    Unknown(Option<String>),

    /// The device has no network connectivity.
    #[error("Not connected to Internet")]
    NotConnectedToInternet,

    /// The transport failed before any HTTP status was received.
    #[error("Network error: {0}")]
    Transport(#[source] TransportError),

    /// The server answered 500, with the failure reason it supplied.
    #[error("Server error{}", suffix(.0))]
    ServerError(Option<String>),

    /// The server rejected the request (400, 404, 422), with the description
    /// it supplied.
    #[error("Invalid request{}", suffix(.0))]
    InvalidRequest(Option<String>),

    /// The server answered 401.
    #[error("User session has expired")]
    Unauthorized,

    /// A JSON body did not have the expected shape.
    #[error("Data are not in correct format and can't be parsed.")]
    DataCantBeParsed,
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(" {message}"),
        None => String::new(),
    }
}

impl NetworkingError {
    pub fn code(&self) -> i32 {
        match self {
            NetworkingError::Unknown(_) => 0,
            NetworkingError::Transport(_) => 1,
            NetworkingError::ServerError(_) => 2,
            NetworkingError::InvalidRequest(_) => 3,
            NetworkingError::Unauthorized => 4,
            NetworkingError::DataCantBeParsed => 5,
            NetworkingError::NotConnectedToInternet => 6,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn localized_description(&self) -> String {
        match self {
            NetworkingError::Unknown(_)
            | NetworkingError::ServerError(_)
            | NetworkingError::DataCantBeParsed => DEFAULT_DESCRIPTION.to_string(),
            NetworkingError::Transport(error) => error.to_string(),
            NetworkingError::Unauthorized => "Your session has expired".to_string(),
            NetworkingError::InvalidRequest(message) => {
                message.clone().unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
            }
            NetworkingError::NotConnectedToInternet => {
                "You are not connected to Internet".to_string()
            }
        }
    }

    /// Diagnostic message for developers. Same text as `Display`.
    pub fn localized_failure_reason(&self) -> String {
        self.to_string()
    }

    /// Flatten into the generic envelope used by error-reporting sinks.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            domain: ERROR_DOMAIN,
            code: self.code(),
            description: self.localized_description(),
            failure_reason: self.localized_failure_reason(),
        }
    }
}

/// Strings extracted from a server error body by a resource's error decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub description: Option<String>,
    pub failure_reason: Option<String>,
}

impl ErrorInfo {
    pub fn new(description: Option<String>, failure_reason: Option<String>) -> Self {
        Self {
            description,
            failure_reason,
        }
    }
}

/// Serializable view of a `NetworkingError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub domain: &'static str,
    pub code: i32,
    pub description: String,
    pub failure_reason: String,
}
