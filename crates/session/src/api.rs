//! Remote authentication seam

use crate::error::SessionError;
use async_trait::async_trait;
use mobank_core::{LoginCredentials, UserProfile};
use mobank_http::{PublicBankingClient, RefreshRequest, RegisterRequest, types::AuthResponse};

/// Tokens presented when asking for a new access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCredentials {
    /// Sent as the bearer
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Authentication endpoints the session controller depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, SessionError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, SessionError>;

    async fn refresh(&self, credentials: &RefreshCredentials) -> Result<AuthResponse, SessionError>;

    /// Invalidate `access_token` server-side
    async fn logout(&self, access_token: &str) -> Result<(), SessionError>;

    /// Current profile of the token's owner
    async fn profile(&self, access_token: &str) -> Result<UserProfile, SessionError>;
}

#[async_trait]
impl AuthApi for PublicBankingClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, SessionError> {
        Ok(Self::login(self, credentials).await?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, SessionError> {
        Ok(Self::register(self, request).await?)
    }

    async fn refresh(&self, credentials: &RefreshCredentials) -> Result<AuthResponse, SessionError> {
        let request = RefreshRequest {
            refresh_token: credentials.refresh_token.clone(),
        };
        Ok(self
            .with_token(credentials.access_token.as_str())
            .refresh(&request)
            .await?)
    }

    async fn logout(&self, access_token: &str) -> Result<(), SessionError> {
        Ok(self.with_token(access_token).logout().await?)
    }

    async fn profile(&self, access_token: &str) -> Result<UserProfile, SessionError> {
        Ok(self.with_token(access_token).profile().await?)
    }
}
