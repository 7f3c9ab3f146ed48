//! Mobank HTTP module
//!
//! Wire types and typed reqwest clients for the banking API. Public endpoints
//! (login, registration) go through [`PublicBankingClient`]; everything that
//! needs a bearer token goes through [`AuthenticatedBankingClient`].

pub mod client;
pub mod types;

pub use client::{AuthenticatedBankingClient, ClientError, PublicBankingClient, TypedClientBuilder};
pub use types::{ApiEnvelope, ApiErrorBody, AuthResponse, RefreshRequest, RegisterRequest};
