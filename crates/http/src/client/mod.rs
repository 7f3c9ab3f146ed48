//! Mobank HTTP client

pub mod auth;
pub mod error;
pub mod typed;
pub mod wallet;

pub use error::ClientError;
pub use typed::{AuthenticatedBankingClient, PublicBankingClient, TypedClientBuilder};
