//! Mobank session
//!
//! Client-side authentication for the mobank banking client: the
//! [`SessionController`] state machine, proactive background token refresh,
//! and the [`RouteGate`] that decides what a rendering surface shows.
//!
//! ```no_run
//! use mobank_core::{LoginCredentials, SessionConfig};
//! use mobank_session::{ChannelNavigator, SessionController};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), mobank_session::SessionError> {
//! let (navigator, _navigation) = ChannelNavigator::new();
//! let session = SessionController::connect(SessionConfig::default(), Arc::new(navigator))?;
//!
//! session.initialize().await;
//! session
//!     .login(&LoginCredentials::new("0592063360", "1234"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod controller;
pub mod error;
pub mod gate;
pub mod navigator;
mod refresh;
pub mod state;

pub use api::{AuthApi, RefreshCredentials};
pub use controller::SessionController;
pub use error::SessionError;
pub use gate::{GateDecision, RouteGate, RoutePolicy, RouteRequirement, decide};
pub use navigator::{ChannelNavigator, NavigationRequest, Navigator};
pub use state::{AuthPhase, Session, SessionAction};
