//! Route gating
//!
//! Decides what a rendering surface shows for a location given the session.
//! [`decide`] is pure; [`RouteGate`] feeds it from a controller and re-checks
//! stored credentials on every navigation.

use crate::controller::SessionController;
use mobank_core::config::RouteConfig;
use tracing::debug;

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteRequirement {
    /// Signed-in users only
    RequireAuth,
    /// Signed-out users only, e.g. login and registration pages
    RequireAnonymous,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub requirement: RouteRequirement,
    /// Overrides the configured login or home path
    pub redirect_to: Option<String>,
}

impl RoutePolicy {
    pub const fn protected() -> Self {
        Self {
            requirement: RouteRequirement::RequireAuth,
            redirect_to: None,
        }
    }

    pub const fn anonymous() -> Self {
        Self {
            requirement: RouteRequirement::RequireAnonymous,
            redirect_to: None,
        }
    }

    pub const fn public() -> Self {
        Self {
            requirement: RouteRequirement::Public,
            redirect_to: None,
        }
    }

    #[must_use]
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = Some(path.into());
        self
    }
}

/// What to render for a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    ShowLoading,
    ShowChildren,
    /// Replace the location with `to`, remembering `from` for after sign-in
    Redirect { to: String, from: Option<String> },
}

/// Decide what to render for `location`
pub fn decide(
    authenticated: bool,
    loading: bool,
    policy: &RoutePolicy,
    location: &str,
    routes: &RouteConfig,
) -> GateDecision {
    if loading {
        return GateDecision::ShowLoading;
    }

    match policy.requirement {
        RouteRequirement::RequireAuth if !authenticated => GateDecision::Redirect {
            to: policy
                .redirect_to
                .clone()
                .unwrap_or_else(|| routes.login_path.clone()),
            from: (location != "/").then(|| location.to_string()),
        },
        RouteRequirement::RequireAnonymous if authenticated => GateDecision::Redirect {
            to: policy
                .redirect_to
                .clone()
                .unwrap_or_else(|| routes.home_path.clone()),
            from: None,
        },
        _ => GateDecision::ShowChildren,
    }
}

/// Route guard bound to a session
#[derive(Debug, Clone)]
pub struct RouteGate {
    controller: SessionController,
}

impl RouteGate {
    pub const fn new(controller: SessionController) -> Self {
        Self { controller }
    }

    /// Re-check stored credentials, then decide
    pub async fn on_route_change(&self, location: &str, policy: &RoutePolicy) -> GateDecision {
        let session = self.controller.check_auth_status().await;
        let decision = decide(
            session.authenticated,
            session.loading,
            policy,
            location,
            self.controller.routes(),
        );

        if let GateDecision::Redirect { to, .. } = &decision {
            debug!(location, to = %to, requirement = ?policy.requirement, "Route gated");
        }
        decision
    }

    /// Decide from the current session without re-checking storage
    pub fn evaluate(&self, location: &str, policy: &RoutePolicy) -> GateDecision {
        let session = self.controller.snapshot();
        decide(
            session.authenticated,
            session.loading,
            policy,
            location,
            self.controller.routes(),
        )
    }
}
