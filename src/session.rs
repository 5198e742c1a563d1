use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::Profile;
use crate::storage::{SESSION_TOKEN_KEY, StorageState};

/// SessionState
///
/// The session is either fully unauthenticated or fully authenticated. The
/// only transient state is `Authenticating` (token installed, profile fetch
/// in flight), and it always resolves to a terminal state before protected
/// content may render.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(Profile),
    Error(String),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// SessionStore
///
/// Owns the session credential and profile exclusively; the role guard only
/// reads snapshots of it. Transitions:
///
/// - `anonymous|error -> authenticating` on `login` (or `initialize` with a
///   stored token),
/// - `authenticating -> authenticated` on successful profile fetch; the token
///   is persisted durably so a reload can resume,
/// - `authenticating -> error` on profile fetch failure; the token is
///   discarded everywhere so no partial state survives,
/// - `authenticated -> anonymous` on `logout` or on the HTTP client reporting
///   an authorization failure on any request.
pub struct SessionStore {
    http: HttpClient,
    storage: StorageState,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(http: HttpClient, storage: StorageState) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            http,
            storage,
            state,
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A live subscription; the guard and any chrome re-evaluate on change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The currently authenticated profile, if any.
    pub fn profile(&self) -> Option<Profile> {
        match &*self.state.borrow() {
            SessionState::Authenticated(profile) => Some(profile.clone()),
            _ => None,
        }
    }

    /// Installs a freshly exchanged token and resolves the session by
    /// fetching the profile. A prior `error` state is cleared by this call.
    pub async fn login(&self, token: String) -> Result<(), ApiError> {
        let _ = self.state.send(SessionState::Authenticating);
        self.http.set_token(Some(token.clone()));
        self.resolve(token).await
    }

    /// Drops the session everywhere: in-memory token slot, durable storage,
    /// and state. Calling this twice in a row is a no-op the second time.
    pub async fn logout(&self) {
        self.http.set_token(None);
        if let Err(e) = self.storage.remove(SESSION_TOKEN_KEY).await {
            tracing::warn!("failed to clear stored token: {e}");
        }
        if *self.state.borrow() != SessionState::Anonymous {
            tracing::info!("session ended");
            let _ = self.state.send(SessionState::Anonymous);
        }
    }

    /// Startup resume. A token found in durable storage enters
    /// `authenticating` directly, skipping `anonymous`; otherwise the
    /// session settles as anonymous.
    pub async fn initialize(&self) {
        match self.storage.get(SESSION_TOKEN_KEY).await {
            Some(token) => {
                tracing::info!("resuming session from stored token");
                let _ = self.state.send(SessionState::Authenticating);
                self.http.set_token(Some(token.clone()));
                let _ = self.resolve(token).await;
            }
            None => {
                let _ = self.state.send(SessionState::Anonymous);
            }
        }
    }

    /// Re-fetches the profile for an authenticated session.
    pub async fn refresh_profile(&self) -> Result<Profile, ApiError> {
        if !self.state.borrow().is_authenticated() {
            return Err(ApiError::Authorization);
        }
        let profile: Profile = self.http.get("/profile").await?;
        let _ = self.state.send(SessionState::Authenticated(profile.clone()));
        Ok(profile)
    }

    /// Spawns the single subscriber to the HTTP client's expiry channel. An
    /// authorization failure observed on any request lands here once per
    /// login epoch and forces the session back to anonymous.
    ///
    /// The task holds only a weak reference, so dropping the store stops it.
    pub fn listen_for_expiry(self: Arc<Self>) {
        let mut rx = self.http.subscribe_expiry();
        let weak = Arc::downgrade(&self);
        drop(self);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(store) = weak.upgrade() else { break };
                if store.state.borrow().is_authenticated() {
                    tracing::warn!("session invalidated by backend");
                    store.logout().await;
                }
            }
        });
    }

    /// Terminal resolution of a login or resume attempt.
    async fn resolve(&self, token: String) -> Result<(), ApiError> {
        match self.http.get::<Profile>("/profile").await {
            Ok(profile) => {
                if let Err(e) = self.storage.set(SESSION_TOKEN_KEY, &token).await {
                    // A session that cannot be persisted still works for this
                    // run; it just will not survive a reload.
                    tracing::warn!("failed to persist session token: {e}");
                }
                tracing::info!(role = ?profile.role, "session established");
                let _ = self.state.send(SessionState::Authenticated(profile));
                Ok(())
            }
            Err(err) => {
                // The token is treated as invalid outright.
                self.http.set_token(None);
                if let Err(e) = self.storage.remove(SESSION_TOKEN_KEY).await {
                    tracing::warn!("failed to clear stored token: {e}");
                }
                tracing::error!("profile fetch failed, session not established: {err}");
                let _ = self.state.send(SessionState::Error(err.user_message()));
                Err(err)
            }
        }
    }
}
