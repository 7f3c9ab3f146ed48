//! Session controller
//!
//! Owns the authentication [`Session`] and performs every transition on it:
//! restoring stored credentials, login, registration, logout and token
//! refresh. State is published through a [`watch`] channel so any number of
//! rendering surfaces can observe it.

use crate::api::{AuthApi, RefreshCredentials};
use crate::error::SessionError;
use crate::navigator::{NavigationRequest, Navigator};
use crate::refresh::spawn_refresh_task;
use crate::state::{Session, SessionAction};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use mobank_core::config::RouteConfig;
use mobank_core::{
    FileStorage, LoginCredentials, Registration, SessionConfig, TokenStore, UserProfile, jwt,
    validation,
};
use mobank_http::{AuthResponse, RegisterRequest, TypedClientBuilder};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type RefreshFlight = Shared<BoxFuture<'static, Result<(), SessionError>>>;

/// Handle to the authentication session. Clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

/// Non-owning handle held by the background refresh task
#[derive(Clone)]
pub(crate) struct WeakSessionController {
    inner: Weak<Inner>,
}

struct Inner {
    api: Arc<dyn AuthApi>,
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    config: SessionConfig,
    state: watch::Sender<Session>,
    /// In-flight refresh shared by every concurrent caller
    refresh: Mutex<Option<RefreshFlight>>,
    /// Cancels the background refresh task while it runs
    background: Mutex<Option<CancellationToken>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let background = self
            .background
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = background.take() {
            token.cancel();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WeakSessionController {
    pub(crate) fn upgrade(&self) -> Option<SessionController> {
        self.inner.upgrade().map(|inner| SessionController { inner })
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: TokenStore,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                navigator,
                config,
                state,
                refresh: Mutex::new(None),
                background: Mutex::new(None),
            }),
        }
    }

    /// Build a controller talking to the configured API and persisting
    /// credentials to the configured file
    pub fn connect(
        config: SessionConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        config
            .validate()
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        let client = TypedClientBuilder::from(&config.api).build_public()?;
        let storage = FileStorage::new(config.storage.file_path());
        info!(
            base_url = %config.api.base_url,
            storage = %config.storage.file_path().display(),
            "Session controller connected"
        );

        Ok(Self::new(
            Arc::new(client),
            TokenStore::new(Arc::new(storage)),
            navigator,
            config,
        ))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn routes(&self) -> &RouteConfig {
        &self.inner.config.routes
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Current state
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub(crate) fn downgrade(&self) -> WeakSessionController {
        WeakSessionController {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn dispatch(&self, action: SessionAction) -> bool {
        self.inner.state.send_if_modified(|session| session.apply(action))
    }

    /// Restore the session on startup
    pub async fn initialize(&self) -> Session {
        self.check_auth_status().await
    }

    /// Reconcile the session with stored credentials.
    ///
    /// An expired stored token is refreshed; if that fails the stored
    /// credentials are discarded. Running this again with unchanged storage
    /// changes nothing.
    pub async fn check_auth_status(&self) -> Session {
        self.dispatch(SessionAction::Checking);

        let store = &self.inner.store;
        match (store.get_token(), store.get_user()) {
            (Some(access_token), Some(user)) if jwt::is_expired(&access_token) => {
                debug!(user_id = %user.id, "Stored access token expired, refreshing");
                self.dispatch(SessionAction::Stale {
                    user,
                    access_token,
                    refresh_token: store.get_refresh_token(),
                });
                if let Err(error) = self.refresh_flight(false).await {
                    warn!(%error, "Could not restore expired session");
                }
            }
            (Some(access_token), Some(user)) => {
                let changed = self.dispatch(SessionAction::Authenticated {
                    user,
                    access_token,
                    refresh_token: store.get_refresh_token(),
                });
                if changed {
                    debug!("Session restored from storage");
                }
                self.start_background_refresh();
            }
            _ => {
                self.stop_background_refresh();
                self.dispatch(SessionAction::Unauthenticated);
            }
        }

        self.snapshot()
    }

    /// Sign in and go to the default authenticated view
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserProfile, SessionError> {
        self.sign_in(credentials, None).await
    }

    /// Sign in and go back to `from`, the page that required authentication
    pub async fn login_from(
        &self,
        credentials: &LoginCredentials,
        from: &str,
    ) -> Result<UserProfile, SessionError> {
        self.sign_in(credentials, Some(from)).await
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
        from: Option<&str>,
    ) -> Result<UserProfile, SessionError> {
        self.dispatch(SessionAction::Begin);

        if let Err(errors) = validation::validate_login(credentials) {
            return Err(self.reject(errors.into()));
        }

        match self.inner.api.login(credentials).await {
            Ok(response) => {
                let user = self.establish(response);
                info!(user_id = %user.id, "Signed in");
                self.navigate_after_sign_in(from);
                Ok(user)
            }
            Err(error) => {
                warn!(%error, "Login failed");
                Err(self.reject(error))
            }
        }
    }

    /// Create an account. The registration response carries a session, so
    /// no separate login follows.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, SessionError> {
        self.dispatch(SessionAction::Begin);

        if let Err(errors) = validation::validate_registration(registration) {
            return Err(self.reject(errors.into()));
        }

        let request = RegisterRequest::from(registration);
        match self.inner.api.register(&request).await {
            Ok(response) => {
                let user = self.establish(response);
                info!(user_id = %user.id, "Registered");
                self.navigate_after_sign_in(None);
                Ok(user)
            }
            Err(error) => {
                warn!(%error, "Registration failed");
                Err(self.reject(error))
            }
        }
    }

    /// Sign out. The local session always ends, even when the server cannot
    /// be told.
    pub async fn logout(&self) {
        self.dispatch(SessionAction::Begin);
        self.stop_background_refresh();

        let access_token = self.inner.state.borrow().access_token.clone();
        if let Some(access_token) = access_token {
            if let Err(error) = self.inner.api.logout(&access_token).await {
                warn!(%error, "Remote logout failed, clearing local session anyway");
            }
        }

        self.end_session(true);
        info!("Signed out");
    }

    /// Exchange the access token for a new one. Concurrent calls share one
    /// request; on failure the session ends.
    pub async fn refresh_token(&self) -> Result<(), SessionError> {
        self.refresh_flight(true).await
    }

    pub fn clear_error(&self) {
        self.dispatch(SessionAction::ClearError);
    }

    /// Re-fetch the profile, picking up the current balance
    pub async fn sync_profile(&self) -> Result<UserProfile, SessionError> {
        let access_token = self
            .inner
            .state
            .borrow()
            .access_token
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        match self.inner.api.profile(&access_token).await {
            Ok(user) => {
                if !self.inner.store.set_user(&user) {
                    warn!("Updated profile could not be persisted");
                }
                self.dispatch(SessionAction::ProfileUpdated(user.clone()));
                Ok(user)
            }
            Err(error) => {
                if error.is_unauthorized() {
                    self.handle_unauthorized();
                }
                Err(error)
            }
        }
    }

    /// The server rejected the session's credentials on an authenticated call
    pub fn handle_unauthorized(&self) {
        warn!("Session rejected by server, signing out");
        self.end_session(true);
    }

    /// Stop background work. The session itself is left untouched.
    pub fn dispose(&self) {
        self.stop_background_refresh();
    }

    /// Whether the background refresh task is running
    pub fn is_refresh_scheduled(&self) -> bool {
        lock(&self.inner.background)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Refresh in the background when the access token is about to expire
    pub(crate) fn refresh_if_expiring(&self, threshold_minutes: i64) {
        let access_token = self.inner.state.borrow().access_token.clone();
        let Some(access_token) = access_token else {
            return;
        };
        if !jwt::expires_within(&access_token, threshold_minutes) {
            return;
        }

        debug!(threshold_minutes, "Access token close to expiry, refreshing");
        let flight = self.refresh_flight(true);
        tokio::spawn(async move {
            if let Err(error) = flight.await {
                warn!(%error, "Background token refresh failed");
            }
        });
    }

    /// Join the in-flight refresh or start one. `redirect` decides whether a
    /// failure sends the user to the login page.
    fn refresh_flight(&self, redirect: bool) -> RefreshFlight {
        let mut slot = lock(&self.inner.refresh);
        if let Some(flight) = slot.as_ref() {
            return flight.clone();
        }

        let session = self.downgrade();
        let flight = async move {
            let Some(controller) = session.upgrade() else {
                return Err(SessionError::NotAuthenticated);
            };
            let result = controller.run_refresh(redirect).await;
            lock(&controller.inner.refresh).take();
            result
        }
        .boxed()
        .shared();

        *slot = Some(flight.clone());
        flight
    }

    async fn run_refresh(&self, redirect: bool) -> Result<(), SessionError> {
        let (access_token, refresh_token) = {
            let session = self.inner.state.borrow();
            (session.access_token.clone(), session.refresh_token.clone())
        };
        let Some(access_token) = access_token else {
            debug!("No access token to refresh");
            self.end_session(redirect);
            return Err(SessionError::NotAuthenticated);
        };

        self.dispatch(SessionAction::Refreshing);
        let credentials = RefreshCredentials {
            access_token,
            refresh_token,
        };

        match self.inner.api.refresh(&credentials).await {
            Ok(response) => {
                let current = self.inner.state.borrow().access_token.clone();
                if current.as_deref() != Some(credentials.access_token.as_str()) {
                    debug!("Session changed while refreshing, discarding new token");
                    return Err(SessionError::NotAuthenticated);
                }
                let user = self.establish(response);
                info!(user_id = %user.id, "Access token refreshed");
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Token refresh failed, ending session");
                self.end_session(redirect);
                Err(error)
            }
        }
    }

    /// Persist and adopt freshly issued credentials
    fn establish(&self, response: AuthResponse) -> UserProfile {
        let AuthResponse {
            token,
            user,
            refresh_token,
            ..
        } = response;

        if !self
            .inner
            .store
            .set_auth_data(&token, &user, refresh_token.as_deref())
        {
            warn!("Credentials could not be persisted, session will not survive a restart");
        }
        self.dispatch(SessionAction::Authenticated {
            user: user.clone(),
            access_token: token,
            refresh_token,
        });
        self.start_background_refresh();
        user
    }

    fn end_session(&self, redirect: bool) {
        self.stop_background_refresh();
        if !self.inner.store.clear_auth_data() {
            warn!("Stored credentials could not be fully cleared");
        }
        self.dispatch(SessionAction::Unauthenticated);
        if redirect {
            let login = self.routes().login_path.clone();
            self.inner.navigator.navigate(NavigationRequest::replace(login));
        }
    }

    fn reject(&self, error: SessionError) -> SessionError {
        self.dispatch(SessionAction::Failed(error.user_message()));
        error
    }

    fn navigate_after_sign_in(&self, from: Option<&str>) {
        let routes = self.routes();
        let target = from
            .filter(|path| is_return_path(path, routes))
            .unwrap_or(&routes.home_path);
        self.inner
            .navigator
            .navigate(NavigationRequest::replace(target));
    }

    fn start_background_refresh(&self) {
        let mut slot = lock(&self.inner.background);
        if slot.as_ref().is_some_and(|token| !token.is_cancelled()) {
            return;
        }

        let cancel = CancellationToken::new();
        spawn_refresh_task(
            self.downgrade(),
            self.inner.config.refresh.clone(),
            cancel.clone(),
        );
        *slot = Some(cancel);
    }

    fn stop_background_refresh(&self) {
        if let Some(token) = lock(&self.inner.background).take() {
            token.cancel();
        }
    }
}

/// In-app location worth returning to after signing in
fn is_return_path(path: &str, routes: &RouteConfig) -> bool {
    path.starts_with('/') && !path.starts_with("//") && path != routes.login_path
}
