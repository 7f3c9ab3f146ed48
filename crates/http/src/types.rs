//! Request and response bodies of the banking API

use mobank_core::{FieldError, Registration, UserProfile};
use serde::{Deserialize, Serialize};

/// Registration request body. The PIN confirmation is checked locally and
/// never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub phone_number: String,
    pub pin: String,
}

impl From<&Registration> for RegisterRequest {
    fn from(registration: &Registration) -> Self {
        Self {
            name: registration.name.trim().to_string(),
            phone_number: registration.phone_number.clone(),
            pin: registration.pin.clone(),
        }
    }
}

/// Refresh request body; the current access token travels as the bearer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Successful login, registration or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// New access token
    pub token: String,
    pub user: UserProfile,
    /// Server-side expiry of the access token
    #[serde(default)]
    pub expires_at: Option<String>,
    /// Present only when the server issues refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Payload that may arrive bare or inside the `{data, message, status}`
/// envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Wrapped {
        data: T,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data, .. } | Self::Bare(data) => data,
        }
    }
}

/// Error body returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    /// Short reason phrase
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<FieldError>,
}

impl ApiErrorBody {
    /// Parse an error body, falling back to treating it as plain text
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
            ..Self::default()
        })
    }
}
