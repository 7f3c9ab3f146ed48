//! Wallet endpoints used by the session layer

use super::{error::ClientError, typed::AuthenticatedBankingClient};
use mobank_core::UserProfile;

impl AuthenticatedBankingClient {
    /// Current user profile, including the up-to-date balance
    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let request = self.request(reqwest::Method::GET, "/wallet/profile");
        self.execute(request).await
    }
}
