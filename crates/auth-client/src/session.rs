//! Session state management.
//!
//! Tracks the current user and exposes the login/signup/logout/initialize
//! operations. State lives in memory; the credential pair backing it lives
//! in the token store and is only written on successful authentication.

use crate::{ApiClient, ApiRequest, ApiResult, AuthResponse, User};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Authentication state of the client.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup resolution has not completed yet.
    Loading,
    /// A valid access token was exchanged for this user profile.
    Authenticated(User),
    /// No usable session.
    Anonymous,
}

/// Callback type for session state change notifications.
pub type SessionStateCallback = Box<dyn Fn(&SessionState) + Send + Sync>;

/// Owns the in-memory session state derived from the token store and the
/// request pipeline.
pub struct SessionController {
    api: Arc<ApiClient>,
    state: Mutex<SessionState>,
    last_error: Mutex<Option<String>>,
    state_callback: Mutex<Option<SessionStateCallback>>,
}

impl SessionController {
    /// Create a new controller in the `Loading` state.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::Loading),
            last_error: Mutex::new(None),
            state_callback: Mutex::new(None),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    /// Current user, if authenticated.
    pub fn current_user(&self) -> Option<User> {
        match &*self.state.lock().unwrap() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Whether a user is currently authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), SessionState::Authenticated(_))
    }

    /// Whether startup resolution is still pending.
    pub fn is_loading(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), SessionState::Loading)
    }

    /// Most recent human-readable failure message, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Set a callback to be notified of session state changes.
    pub fn set_state_callback(&self, callback: SessionStateCallback) {
        let mut cb = self.state_callback.lock().unwrap();
        *cb = Some(callback);
    }

    fn set_state(&self, new_state: SessionState) {
        let mut state = self.state.lock().unwrap();
        if *state == new_state {
            return;
        }
        debug!(old_state = ?*state, new_state = ?new_state, "Session state transition");
        *state = new_state.clone();
        drop(state);

        let cb = self.state_callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(&new_state);
        }
    }

    fn set_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap() = message;
    }

    /// Resolve the session once at startup.
    ///
    /// With no stored access token this resolves to `Anonymous` without any
    /// network call. Otherwise the token is exchanged for a user profile
    /// via `/auth/me`; a failure that survives the pipeline's own refresh
    /// cycle clears the tokens and resolves to `Anonymous`. Never leaves
    /// the controller in `Loading`, even when the token store itself fails.
    pub async fn initialize(&self) -> ApiResult<Option<User>> {
        let has_token = match self.api.tokens().has_access_token() {
            Ok(has) => has,
            Err(e) => {
                warn!(error = %e, "Token store unavailable, starting anonymous");
                self.set_state(SessionState::Anonymous);
                return Err(e.into());
            }
        };

        if !has_token {
            debug!("No stored access token, starting anonymous");
            self.set_state(SessionState::Anonymous);
            return Ok(None);
        }

        let fetched: ApiResult<User> = async {
            let response = self.api.execute(&ApiRequest::get("/auth/me")).await?;
            Ok(response.json::<User>().await?)
        }
        .await;

        match fetched {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                self.set_state(SessionState::Authenticated(user.clone()));
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed, clearing tokens");
                // Resolve the state before surfacing any storage failure.
                let cleared = self.api.tokens().clear_tokens();
                self.set_state(SessionState::Anonymous);
                cleared?;
                Ok(None)
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On success both tokens from the response are persisted and the state
    /// becomes `Authenticated`. On failure nothing is persisted, the prior
    /// state is kept, and the error propagates.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.set_error(None);

        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        match self.authenticate("/auth/login", &body).await {
            Ok(data) => {
                info!(user_id = %data.user.id, "Login successful");
                Ok(data.user)
            }
            Err(e) => {
                let message = e.user_message("Login failed");
                warn!(error = %e, "Login failed");
                self.set_error(Some(message));
                Err(e)
            }
        }
    }

    /// Register a new account.
    ///
    /// Same persistence and failure semantics as [`login`](Self::login).
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> ApiResult<User> {
        self.set_error(None);

        let body = serde_json::json!({
            "email": email,
            "password": password,
            "name": name,
        });

        match self.authenticate("/auth/signup", &body).await {
            Ok(data) => {
                info!(user_id = %data.user.id, "Signup successful");
                Ok(data.user)
            }
            Err(e) => {
                let message = e.user_message("Signup failed");
                warn!(error = %e, "Signup failed");
                self.set_error(Some(message));
                Err(e)
            }
        }
    }

    /// Shared login/signup call: unauthenticated POST, then persist the
    /// credential pair together before exposing the new state.
    async fn authenticate(&self, path: &str, body: &serde_json::Value) -> ApiResult<AuthResponse> {
        let response = self.api.post_unauthenticated(path, body).await?;
        let data: AuthResponse = response.json().await?;

        self.api
            .tokens()
            .set_session(&data.access_token, &data.refresh_token)?;
        self.set_state(SessionState::Authenticated(data.user.clone()));

        Ok(data)
    }

    /// Log out.
    ///
    /// The server call is best-effort; a failure is logged and swallowed.
    /// Tokens are cleared and the state set to `Anonymous` regardless, so a
    /// dead network can never leave stale credentials behind.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(e) = self.api.execute(&ApiRequest::post("/auth/logout")).await {
            warn!(error = %e, "Logout request failed, clearing session anyway");
        }

        self.api.tokens().clear_tokens()?;
        self.set_state(SessionState::Anonymous);
        info!("Logged out");
        Ok(())
    }
}
