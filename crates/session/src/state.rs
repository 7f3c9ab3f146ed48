//! Session state and the reducer every transition goes through

use mobank_core::UserProfile;
use std::fmt;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthPhase {
    /// Nothing has been checked yet
    #[default]
    Uninitialized,
    /// Reading stored credentials for the first time
    Checking,
    Authenticated,
    /// Exchanging the access token for a new one
    Refreshing,
    Unauthenticated,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Checking => "checking",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
            Self::Unauthenticated => "unauthenticated",
        };
        f.write_str(name)
    }
}

/// Authentication state published to subscribers.
///
/// `authenticated` implies `user` and a non-expired `access_token` as of the
/// last check.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub phase: AuthPhase,
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub authenticated: bool,
    /// An authentication check or transition is in flight
    pub loading: bool,
    /// User-facing message of the last failed operation
    pub last_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: AuthPhase::Uninitialized,
            user: None,
            access_token: None,
            refresh_token: None,
            authenticated: false,
            loading: true, // Start loading until stored credentials are checked
            last_error: None,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("user", &self.user.as_ref().map(|u| &u.id))
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("authenticated", &self.authenticated)
            .field("loading", &self.loading)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Session transitions
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// First read of stored credentials; ignored once initialized
    Checking,
    /// Credentials verified or freshly issued. A missing refresh token keeps
    /// the one already held.
    Authenticated {
        user: UserProfile,
        access_token: String,
        refresh_token: Option<String>,
    },
    /// Stored credentials whose access token has expired and must be
    /// refreshed before use
    Stale {
        user: UserProfile,
        access_token: String,
        refresh_token: Option<String>,
    },
    Refreshing,
    /// A user-initiated operation started
    Begin,
    /// Drop all credentials. The last error survives so a failed login stays
    /// visible across re-checks.
    Unauthenticated,
    Failed(String),
    ClearError,
    /// Profile re-fetched from the server
    ProfileUpdated(UserProfile),
}

impl Session {
    /// Apply `action`, returning whether anything changed
    pub fn apply(&mut self, action: SessionAction) -> bool {
        let next = self.clone().reduce(action);
        if next == *self {
            return false;
        }
        *self = next;
        true
    }

    fn reduce(self, action: SessionAction) -> Self {
        match action {
            SessionAction::Checking if self.phase == AuthPhase::Uninitialized => Self {
                phase: AuthPhase::Checking,
                loading: true,
                ..self
            },
            SessionAction::Checking => self,
            SessionAction::Authenticated {
                user,
                access_token,
                refresh_token,
            } => Self {
                phase: AuthPhase::Authenticated,
                refresh_token: refresh_token.or(self.refresh_token),
                user: Some(user),
                access_token: Some(access_token),
                authenticated: true,
                loading: false,
                last_error: None,
            },
            SessionAction::Stale {
                user,
                access_token,
                refresh_token,
            } => Self {
                phase: AuthPhase::Refreshing,
                user: Some(user),
                access_token: Some(access_token),
                refresh_token,
                authenticated: false,
                loading: true,
                ..self
            },
            // A background refresh keeps an authenticated UI rendered
            SessionAction::Refreshing => Self {
                phase: AuthPhase::Refreshing,
                loading: !self.authenticated,
                ..self
            },
            SessionAction::Begin => Self {
                loading: true,
                last_error: None,
                ..self
            },
            SessionAction::Unauthenticated => Self {
                phase: AuthPhase::Unauthenticated,
                user: None,
                access_token: None,
                refresh_token: None,
                authenticated: false,
                loading: false,
                last_error: self.last_error,
            },
            SessionAction::Failed(message) => Self {
                phase: if self.authenticated {
                    self.phase
                } else {
                    AuthPhase::Unauthenticated
                },
                loading: false,
                last_error: Some(message),
                ..self
            },
            SessionAction::ClearError => Self {
                last_error: None,
                ..self
            },
            SessionAction::ProfileUpdated(user) if self.user.is_some() => Self {
                user: Some(user),
                ..self
            },
            SessionAction::ProfileUpdated(_) => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn user(balance: i64) -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            name: "Ama Mensah".to_string(),
            phone_number: "0592063360".to_string(),
            balance: Decimal::new(balance, 0),
            created_at: "2024-05-01T10:00:00Z".to_string(),
        }
    }

    fn authenticated() -> SessionAction {
        SessionAction::Authenticated {
            user: user(10),
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
        }
    }

    #[test]
    fn test_default_is_uninitialized_and_loading() {
        let session = Session::default();
        assert_eq!(session.phase, AuthPhase::Uninitialized);
        assert!(session.loading);
        assert!(!session.authenticated);
    }

    #[test]
    fn test_checking_only_from_uninitialized() {
        let mut session = Session::default();
        assert!(session.apply(SessionAction::Checking));
        assert_eq!(session.phase, AuthPhase::Checking);

        session.apply(authenticated());
        assert!(!session.apply(SessionAction::Checking));
        assert_eq!(session.phase, AuthPhase::Authenticated);
    }

    #[test]
    fn test_repeated_action_reports_no_change() {
        let mut session = Session::default();
        assert!(session.apply(authenticated()));
        assert!(!session.apply(authenticated()));
    }

    #[test]
    fn test_authenticated_keeps_refresh_token_when_absent() {
        let mut session = Session::default();
        session.apply(authenticated());
        session.apply(SessionAction::Authenticated {
            user: user(20),
            access_token: "access-2".to_string(),
            refresh_token: None,
        });

        assert_eq!(session.access_token.as_deref(), Some("access-2"));
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(session.user.unwrap().balance, Decimal::new(20, 0));
    }

    #[test]
    fn test_stale_session_is_not_authenticated() {
        let mut session = Session::default();
        session.apply(SessionAction::Stale {
            user: user(10),
            access_token: "expired".to_string(),
            refresh_token: None,
        });

        assert_eq!(session.phase, AuthPhase::Refreshing);
        assert!(!session.authenticated);
        assert!(session.loading);
    }

    #[test]
    fn test_background_refresh_keeps_ui_authenticated() {
        let mut session = Session::default();
        session.apply(authenticated());
        session.apply(SessionAction::Refreshing);

        assert_eq!(session.phase, AuthPhase::Refreshing);
        assert!(session.authenticated);
        assert!(!session.loading);
    }

    #[test]
    fn test_failed_login_keeps_error_across_unauthenticated() {
        let mut session = Session::default();
        session.apply(SessionAction::Begin);
        session.apply(SessionAction::Failed("Invalid phone number or PIN.".to_string()));
        assert_eq!(session.phase, AuthPhase::Unauthenticated);
        assert!(!session.loading);

        assert!(!session.apply(SessionAction::Unauthenticated));
        assert!(session.last_error.is_some());

        assert!(session.apply(SessionAction::ClearError));
        assert_eq!(session.last_error, None);
    }

    #[test]
    fn test_unauthenticated_drops_credentials() {
        let mut session = Session::default();
        session.apply(authenticated());
        session.apply(SessionAction::Unauthenticated);

        assert_eq!(session.user, None);
        assert_eq!(session.access_token, None);
        assert_eq!(session.refresh_token, None);
        assert!(!session.authenticated);
    }

    #[test]
    fn test_profile_update_requires_user() {
        let mut session = Session::default();
        assert!(!session.apply(SessionAction::ProfileUpdated(user(99))));

        session.apply(authenticated());
        assert!(session.apply(SessionAction::ProfileUpdated(user(99))));
        assert_eq!(session.user.unwrap().balance, Decimal::new(99, 0));
    }
}
