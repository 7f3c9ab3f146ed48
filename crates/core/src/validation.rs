//! Local validation of login and registration input
//!
//! Runs before any network call so malformed input never reaches the API.

use crate::types::{LoginCredentials, Registration};
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_PHONE_DIGITS: usize = 10;
const PIN_LENGTH: usize = 4;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;

/// A problem with one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the field (`phoneNumber`, `pin`, ...)
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field error found in one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Messages for a single field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

/// Strip everything but ASCII digits
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

fn check_phone(phone: &str, errors: &mut ValidationErrors) {
    if phone.trim().is_empty() {
        errors.push("phoneNumber", "Phone number is required");
    } else if phone_digits(phone).len() < MIN_PHONE_DIGITS {
        errors.push("phoneNumber", "Phone number must be at least 10 digits");
    }
}

fn check_pin(pin: &str, errors: &mut ValidationErrors) {
    if pin.chars().count() != PIN_LENGTH {
        errors.push("pin", "PIN must be exactly 4 digits");
    } else if !pin.chars().all(|c| c.is_ascii_digit()) {
        errors.push("pin", "PIN must contain only digits");
    }
}

/// Validate login input
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_phone(&credentials.phone_number, &mut errors);
    check_pin(&credentials.pin, &mut errors);
    errors.into_result()
}

/// Validate registration input, including the PIN confirmation
pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = registration.name.trim();
    let name_length = name.chars().count();
    if name.is_empty() {
        errors.push("name", "Name is required");
    } else if name_length < MIN_NAME_LENGTH {
        errors.push("name", "Name must be at least 2 characters");
    } else if name_length > MAX_NAME_LENGTH {
        errors.push("name", "Name must be less than 50 characters");
    }

    check_phone(&registration.phone_number, &mut errors);
    check_pin(&registration.pin, &mut errors);

    if registration.confirm_pin.is_empty() {
        errors.push("confirmPin", "Please confirm your PIN");
    } else if registration.confirm_pin != registration.pin {
        errors.push("confirmPin", "PINs don't match");
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(name: &str, phone: &str, pin: &str, confirm: &str) -> Registration {
        Registration {
            name: name.to_string(),
            phone_number: phone.to_string(),
            pin: pin.to_string(),
            confirm_pin: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_login() {
        let credentials = LoginCredentials::new("(059) 206-3360", "1234");
        assert!(validate_login(&credentials).is_ok());
    }

    #[test]
    fn test_short_phone_mentions_ten_digits() {
        let errors = validate_login(&LoginCredentials::new("123", "1234")).unwrap_err();
        assert_eq!(errors.errors.len(), 1);
        assert!(errors.to_string().contains("10 digits"));
        assert_eq!(errors.errors[0].field, "phoneNumber");
    }

    #[test]
    fn test_login_reports_every_field() {
        let errors = validate_login(&LoginCredentials::new("  ", "12a4")).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "Phone number is required, PIN must contain only digits"
        );
    }

    #[test]
    fn test_pin_length() {
        let errors = validate_login(&LoginCredentials::new("0592063360", "12345")).unwrap_err();
        assert_eq!(
            errors.for_field("pin").collect::<Vec<_>>(),
            vec!["PIN must be exactly 4 digits"]
        );
    }

    #[test]
    fn test_registration_pin_mismatch() {
        let errors =
            validate_registration(&registration("Ama Mensah", "0592063360", "1234", "5678")).unwrap_err();
        assert_eq!(
            errors.for_field("confirmPin").collect::<Vec<_>>(),
            vec!["PINs don't match"]
        );
        assert_eq!(errors.errors.len(), 1);
    }

    #[test]
    fn test_registration_name_rules() {
        let short = validate_registration(&registration(" A ", "0592063360", "1234", "1234")).unwrap_err();
        assert_eq!(short.to_string(), "Name must be at least 2 characters");

        let long_name = "A".repeat(51);
        let long = validate_registration(&registration(&long_name, "0592063360", "1234", "1234")).unwrap_err();
        assert_eq!(long.to_string(), "Name must be less than 50 characters");

        let missing = validate_registration(&registration("", "0592063360", "1234", "")).unwrap_err();
        assert_eq!(missing.to_string(), "Name is required, Please confirm your PIN");
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&registration("Ama Mensah", "233592063360", "4321", "4321")).is_ok());
    }
}
