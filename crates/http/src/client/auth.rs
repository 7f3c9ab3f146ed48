//! Authentication endpoints

use super::{
    error::ClientError,
    typed::{AuthenticatedBankingClient, PublicBankingClient},
};
use crate::types::{AuthResponse, RefreshRequest, RegisterRequest};
use mobank_core::LoginCredentials;

/// Authentication endpoints for public client
impl PublicBankingClient {
    /// Sign in with phone number and PIN
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/auth/login")
            .json(credentials);
        self.execute(req).await
    }

    /// Create an account; the response already carries a session
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/auth/register")
            .json(request);
        self.execute(req).await
    }
}

/// Authentication endpoints for authenticated client
impl AuthenticatedBankingClient {
    /// Exchange the current access token (and refresh token, if any) for a
    /// new one
    pub async fn refresh(&self, request: &RefreshRequest) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/auth/refresh")
            .json(request);
        self.execute(req).await
    }

    /// Invalidate the access token on the server
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = self.request(reqwest::Method::POST, "/auth/logout");
        self.execute_empty(req).await
    }
}
