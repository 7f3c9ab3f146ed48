//! User-facing error messages

pub const INSUFFICIENT_FUNDS: &str = "You don't have enough balance for this transfer.";
pub const USER_NOT_FOUND: &str = "The recipient phone number was not found.";
pub const INVALID_CREDENTIALS: &str = "Invalid phone number or PIN. Please try again.";
pub const NETWORK_ERROR: &str = "Connection problem. Please check your internet and try again.";
pub const DUPLICATE_PHONE: &str = "This phone number is already registered.";
pub const INVALID_AMOUNT: &str = "Please enter a valid amount.";
pub const TRANSFER_TO_SELF: &str = "You cannot transfer money to yourself.";
pub const SERVER_ERROR: &str = "Something went wrong on our end. Please try again later.";
pub const VALIDATION_ERROR: &str = "Please check your input and try again.";
pub const TIMEOUT_ERROR: &str = "Request timed out. Please try again.";

/// Known server phrasings and the message shown for them. A rule matches
/// when every fragment of one of its alternatives occurs in the message.
const PATTERNS: &[(&[&[&str]], &str)] = &[
    (&[&["insufficient funds"], &["insufficient balance"]], INSUFFICIENT_FUNDS),
    (&[&["user not found"], &["recipient not found"]], USER_NOT_FOUND),
    (&[&["invalid credentials"], &["authentication failed"]], INVALID_CREDENTIALS),
    (&[&["duplicate", "phone"]], DUPLICATE_PHONE),
    (&[&["invalid amount"], &["amount must be"]], INVALID_AMOUNT),
    (&[&["cannot transfer to yourself"], &["self transfer"]], TRANSFER_TO_SELF),
    (&[&["validation"], &["invalid input"]], VALIDATION_ERROR),
    (&[&["timeout"], &["timed out"]], TIMEOUT_ERROR),
];

/// Message for a known server phrasing, if any
pub fn match_known_pattern(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    PATTERNS.iter().find_map(|(alternatives, friendly)| {
        alternatives
            .iter()
            .any(|fragments| fragments.iter().all(|f| lowered.contains(f)))
            .then_some(*friendly)
    })
}

/// Message for an HTTP status when the server gave no usable text
pub const fn for_status(status: u16) -> &'static str {
    match status {
        400 => VALIDATION_ERROR,
        401 => INVALID_CREDENTIALS,
        404 => USER_NOT_FOUND,
        408 => TIMEOUT_ERROR,
        409 => DUPLICATE_PHONE,
        _ => SERVER_ERROR,
    }
}

/// Translate an API rejection into what the user should read.
///
/// Known phrasings win, then the server's own message, then the status code.
pub fn friendly_message(status: Option<u16>, message: &str) -> String {
    if let Some(friendly) = match_known_pattern(message) {
        return friendly.to_string();
    }
    if !message.trim().is_empty() {
        return message.to_string();
    }
    status.map_or(SERVER_ERROR, for_status).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_patterns() {
        assert_eq!(friendly_message(Some(400), "Insufficient funds in wallet"), INSUFFICIENT_FUNDS);
        assert_eq!(friendly_message(Some(401), "Invalid credentials"), INVALID_CREDENTIALS);
        assert_eq!(
            friendly_message(Some(409), "Duplicate entry for phone number 0592063360"),
            DUPLICATE_PHONE
        );
        assert_eq!(friendly_message(None, "Gateway timed out"), TIMEOUT_ERROR);
    }

    #[test]
    fn test_duplicate_requires_phone() {
        assert_eq!(match_known_pattern("duplicate request id"), None);
    }

    #[test]
    fn test_unknown_message_is_shown_raw() {
        assert_eq!(friendly_message(Some(422), "Account is frozen"), "Account is frozen");
    }

    #[test]
    fn test_empty_message_falls_back_to_status() {
        assert_eq!(friendly_message(Some(404), ""), USER_NOT_FOUND);
        assert_eq!(friendly_message(Some(503), "  "), SERVER_ERROR);
        assert_eq!(friendly_message(None, ""), SERVER_ERROR);
    }
}
