//! Session data model shared by the client crates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cached profile of the signed-in account holder.
///
/// Always replaced as a whole from a server response, never patched field by
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Opaque user identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub phone_number: String,
    /// Wallet balance
    pub balance: Decimal,
    /// Account creation timestamp as sent by the server
    pub created_at: String,
}

/// Everything persisted for a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}

/// Phone number and PIN submitted from the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub phone_number: String,
    pub pin: String,
}

impl LoginCredentials {
    pub fn new(phone_number: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            pin: pin.into(),
        }
    }
}

/// Registration form input, including the PIN confirmation that never
/// leaves the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub phone_number: String,
    pub pin: String,
    pub confirm_pin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_uses_camel_case_fields() {
        let json = serde_json::json!({
            "id": "u-1",
            "name": "Ama Mensah",
            "phoneNumber": "0592063360",
            "balance": 250.75,
            "createdAt": "2024-05-01T10:00:00Z"
        });

        let user: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(user.phone_number, "0592063360");
        assert_eq!(user.balance, Decimal::new(25075, 2));
        assert_eq!(user.created_at, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_login_credentials_wire_shape() {
        let credentials = LoginCredentials::new("0592063360", "1234");
        let value = serde_json::to_value(&credentials).unwrap();
        assert_eq!(value["phoneNumber"], "0592063360");
        assert_eq!(value["pin"], "1234");
    }
}
