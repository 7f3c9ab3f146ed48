//! Persistence of the access token, refresh token and cached user profile

use crate::storage::KeyValueStorage;
use crate::types::{StoredCredentials, UserProfile};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key for the access token
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key for the serialized user profile
pub const USER_KEY: &str = "user_data";
/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The three independently stored entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    AccessToken,
    RefreshToken,
    UserProfile,
}

impl TokenKind {
    pub const ALL: [Self; 3] = [Self::AccessToken, Self::UserProfile, Self::RefreshToken];

    /// Storage key this kind is persisted under
    pub const fn key(self) -> &'static str {
        match self {
            Self::AccessToken => TOKEN_KEY,
            Self::RefreshToken => REFRESH_TOKEN_KEY,
            Self::UserProfile => USER_KEY,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Credential store on top of a [`KeyValueStorage`] backend.
///
/// Backend failures never propagate: reads degrade to `None`, writes report
/// `false`, and both are logged.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Raw value for `kind`; empty strings count as absent
    pub fn get(&self, kind: TokenKind) -> Option<String> {
        match self.storage.get_item(kind.key()) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(error) => {
                warn!(entry = %kind, %error, "Failed to read from credential storage");
                None
            }
        }
    }

    /// Write `value` for `kind`, returning whether the write succeeded
    pub fn set(&self, kind: TokenKind, value: &str) -> bool {
        match self.storage.set_item(kind.key(), value) {
            Ok(()) => true,
            Err(error) => {
                warn!(entry = %kind, %error, "Failed to write to credential storage");
                false
            }
        }
    }

    /// Remove every entry. Each removal is attempted even if an earlier one
    /// fails.
    pub fn clear(&self) -> bool {
        let mut cleared = true;
        for kind in TokenKind::ALL {
            if let Err(error) = self.storage.remove_item(kind.key()) {
                warn!(entry = %kind, %error, "Failed to clear credential storage");
                cleared = false;
            }
        }
        cleared
    }

    pub fn get_token(&self) -> Option<String> {
        self.get(TokenKind::AccessToken)
    }

    pub fn set_token(&self, token: &str) -> bool {
        self.set(TokenKind::AccessToken, token)
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.get(TokenKind::RefreshToken)
    }

    pub fn set_refresh_token(&self, refresh_token: &str) -> bool {
        self.set(TokenKind::RefreshToken, refresh_token)
    }

    /// Cached user profile. A value that does not parse is treated as absent.
    pub fn get_user(&self) -> Option<UserProfile> {
        let raw = self.get(TokenKind::UserProfile)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(%error, "Discarding unreadable cached user profile");
                None
            }
        }
    }

    pub fn set_user(&self, user: &UserProfile) -> bool {
        match serde_json::to_string(user) {
            Ok(serialized) => self.set(TokenKind::UserProfile, &serialized),
            Err(error) => {
                warn!(%error, "Failed to serialize user profile");
                false
            }
        }
    }

    /// Store token, then user, then the refresh token when one is provided.
    ///
    /// A missing refresh token leaves any previously stored one untouched.
    pub fn set_auth_data(&self, token: &str, user: &UserProfile, refresh_token: Option<&str>) -> bool {
        let mut stored = self.set_token(token);
        stored &= self.set_user(user);
        if let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) {
            stored &= self.set_refresh_token(refresh_token);
        }
        debug!(user_id = %user.id, complete = stored, "Stored authentication data");
        stored
    }

    pub fn clear_auth_data(&self) -> bool {
        let cleared = self.clear();
        debug!(cleared, "Cleared authentication data");
        cleared
    }

    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }

    pub fn has_user(&self) -> bool {
        self.get_user().is_some()
    }

    pub fn has_complete_auth_data(&self) -> bool {
        self.has_token() && self.has_user()
    }

    /// Everything needed to restore a session, if both token and user exist
    pub fn credentials(&self) -> Option<StoredCredentials> {
        let access_token = self.get_token()?;
        let user = self.get_user()?;
        Some(StoredCredentials {
            access_token,
            refresh_token: self.get_refresh_token(),
            user,
        })
    }
}
