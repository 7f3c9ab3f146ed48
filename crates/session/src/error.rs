//! Session error types

use mobank_core::{FieldError, ValidationErrors, messages};
use mobank_http::ClientError;
use thiserror::Error;

/// Errors surfaced by session operations.
///
/// `Clone` so that the outcome of one shared token refresh can be handed to
/// every caller awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Input rejected locally before any network call
    #[error("{0}")]
    Validation(ValidationErrors),

    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// The API answered with an error status
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        field_errors: Vec<FieldError>,
    },

    /// The API answered with a body that could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The operation needs an access token and none is held
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Message suitable for showing to the account holder
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::Network(_) => messages::NETWORK_ERROR.to_string(),
            Self::Timeout => messages::TIMEOUT_ERROR.to_string(),
            Self::Rejected { status, message, .. } => {
                messages::friendly_message(Some(*status), message)
            }
            Self::NotAuthenticated => messages::for_status(401).to_string(),
            Self::InvalidResponse(_) | Self::Configuration(_) => messages::SERVER_ERROR.to_string(),
        }
    }

    /// Whether the server no longer accepts the session's credentials
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }

    /// Field-level errors, from local validation or the API
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => &errors.errors,
            Self::Rejected { field_errors, .. } => field_errors,
            _ => &[],
        }
    }
}

impl From<ValidationErrors> for SessionError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ClientError> for SessionError {
    fn from(error: ClientError) -> Self {
        let status = error.status();
        match error {
            ClientError::Request(e) if e.is_timeout() => Self::Timeout,
            ClientError::Request(e) if e.is_decode() => Self::InvalidResponse(e.to_string()),
            ClientError::Request(e) => Self::Network(e.to_string()),
            ClientError::Serialization(e) => Self::InvalidResponse(e.to_string()),
            ClientError::Configuration(message) => Self::Configuration(message),
            ClientError::BadRequest {
                message,
                field_errors,
            } => Self::Rejected {
                status: 400,
                message,
                field_errors,
            },
            ClientError::ServerError { message, .. }
            | ClientError::AuthenticationFailed(message)
            | ClientError::NotFound(message)
            | ClientError::Forbidden(message)
            | ClientError::Conflict(message) => Self::Rejected {
                status: status.unwrap_or(500),
                message,
                field_errors: Vec::new(),
            },
        }
    }
}
