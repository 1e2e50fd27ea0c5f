//! Session lifecycle
//!
//! The [`Session`] owns the current actor and the persisted credentials.
//! It is created once at wiring time and handed to consumers as an
//! `Arc<Session>`; tests inject a fake [`AuthApi`] and an in-memory store.
//!
//! ```text
//! Unloaded ──initialize──► Loading ──┬─► Authenticated(actor) ◄──login──┐
//!                                    └─► Unauthenticated ───────────────┘
//!                     Authenticated ──logout / invalidate──► Unauthenticated
//! ```
//!
//! Remote failures never escape: every operation reports a boolean (or
//! nothing) and leaves a human-readable message in [`Session::error`].
//! Errors fail closed. A failed restore clears the stored credentials.
//!
//! Concurrent mutations are not serialized; the last one to finish wins.
//! Every transition publishes one complete [`SessionState`], so readers never
//! observe a half-updated session.

use std::sync::{Arc, RwLock};

use freightdesk_rbac::{policy, Actor, ActorUpdate, Permission, Requirement, Role};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{AuthApi, HttpAuthClient};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::store::CredentialStore;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing attempted yet.
    #[default]
    Unloaded,
    /// Restoring persisted credentials.
    Loading,
    /// Signed in.
    Authenticated(Arc<Actor>),
    /// Signed out, or restore failed.
    Unauthenticated,
}

impl SessionState {
    /// The signed-in actor, if any.
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            SessionState::Authenticated(actor) => Some(actor.as_ref()),
            _ => None,
        }
    }

    /// Check if the session is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Check if the outcome is still unknown (`Unloaded` or `Loading`).
    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Unloaded | SessionState::Loading)
    }
}

/// Storage keys for the persisted tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key of the access token.
    pub access_token: String,
    /// Key of the refresh token.
    pub refresh_token: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for StorageKeys {
    fn from(config: &AuthConfig) -> Self {
        Self {
            access_token: config.access_token_key.clone(),
            refresh_token: config.refresh_token_key.clone(),
        }
    }
}

/// Session handle: the single writer of the current actor.
pub struct Session {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialStore>,
    keys: StorageKeys,
    state: watch::Sender<SessionState>,
    error: RwLock<Option<String>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("keys", &self.keys)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl Session {
    /// Create an unloaded session.
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn CredentialStore>, keys: StorageKeys) -> Self {
        let (state, _) = watch::channel(SessionState::Unloaded);
        Self {
            api,
            store,
            keys,
            state,
            error: RwLock::new(None),
        }
    }

    /// Create a session backed by the HTTP auth client.
    pub fn http(config: AuthConfig, store: Arc<dyn CredentialStore>) -> AuthResult<Self> {
        let keys = StorageKeys::from(&config);
        let api = HttpAuthClient::new(config)?;
        Ok(Self::new(Arc::new(api), store, keys))
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The signed-in actor, if any.
    pub fn actor(&self) -> Option<Arc<Actor>> {
        match &*self.state.borrow() {
            SessionState::Authenticated(actor) => Some(Arc::clone(actor)),
            _ => None,
        }
    }

    /// Check if the session is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Check if the session is still restoring.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Message of the last failed operation, cleared by the next success.
    pub fn error(&self) -> Option<String> {
        self.error
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Check a role against the current actor.
    pub fn has_role(&self, role: Role) -> bool {
        policy::has_role(self.actor().as_deref(), role)
    }

    /// Check a permission against the current actor.
    pub fn has_permission(&self, permission: Permission) -> bool {
        policy::has_permission(self.actor().as_deref(), permission)
    }

    /// Route-style check against the current actor.
    pub fn is_authorized(&self, roles: &[Role], permissions: &[Permission]) -> bool {
        policy::is_authorized(self.actor().as_deref(), roles, permissions)
    }

    /// Evaluate a bundled requirement against the current actor.
    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        policy::satisfies(self.actor().as_deref(), requirement)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Restore the session from persisted credentials.
    ///
    /// Runs once: a session that has left `Unloaded` is returned as-is.
    /// Returns whether the session ended up authenticated.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> bool {
        let unloaded = matches!(*self.state.borrow(), SessionState::Unloaded);
        if !unloaded {
            return self.is_authenticated();
        }

        self.set_state(SessionState::Loading);

        if self.store.get(&self.keys.access_token).is_none() {
            debug!("No persisted access token");
            self.clear_credentials();
            self.set_state(SessionState::Unauthenticated);
            return false;
        }

        match self.restore().await {
            Ok(actor) => {
                info!(actor_id = %actor.id, "Session restored");
                self.clear_error();
                self.set_state(SessionState::Authenticated(Arc::new(actor)));
                true
            }
            Err(e) => {
                report(&e, "Session restore failed");
                self.fail_closed(&e);
                false
            }
        }
    }

    async fn restore(&self) -> AuthResult<Actor> {
        #[cfg(feature = "jwt")]
        {
            let token = self.access_token()?;
            if crate::token::is_expired(&token, chrono::Utc::now()) {
                debug!("Persisted access token expired, refreshing");
                if !self.refresh_token().await {
                    return Err(AuthError::TokenExpired);
                }
            }
        }

        let token = self.access_token()?;
        self.api.validate_token(&token).await?;
        let actor = self.api.me(&token).await?;
        ensure_active(&actor)?;
        Ok(actor)
    }

    /// Sign in with username and password.
    ///
    /// On success the tokens are persisted and the session becomes
    /// authenticated. On failure the store is untouched, the error message
    /// is set and `false` is returned.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> bool {
        match self.try_login(username, password).await {
            Ok(actor) => {
                info!(actor_id = %actor.id, "Login succeeded");
                self.clear_error();
                self.set_state(SessionState::Authenticated(Arc::new(actor)));
                true
            }
            Err(e) => {
                report(&e, "Login failed");
                self.set_error(e.user_message());
                if !self.is_authenticated() {
                    self.set_state(SessionState::Unauthenticated);
                }
                false
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> AuthResult<Actor> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials(
                "Username and password are required".to_string(),
            ));
        }

        let response = self.api.login(username, password).await?;
        ensure_active(&response.user)?;

        self.store.set(&self.keys.access_token, &response.access_token);
        self.store.set(&self.keys.refresh_token, &response.refresh_token);

        Ok(response.user)
    }

    /// Sign out.
    ///
    /// The backend is told on a best-effort basis; the persisted credentials
    /// are removed and the session becomes unauthenticated even when that
    /// call fails. Calling it again is harmless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.store.get(&self.keys.access_token) {
            if let Err(e) = self.api.logout(&token).await {
                warn!(error = %e, "Remote logout failed, clearing local session anyway");
            }
        }

        self.clear_credentials();
        self.clear_error();
        self.set_state(SessionState::Unauthenticated);
        info!("Logged out");
    }

    /// Renew the access token with the persisted refresh token.
    ///
    /// Does not change the session state; on `false` the caller decides
    /// whether to [`invalidate`](Self::invalidate). Only a signed-in or
    /// restoring session renews; otherwise returns `false` and leaves the
    /// store alone.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> bool {
        let renewable = matches!(
            *self.state.borrow(),
            SessionState::Authenticated(_) | SessionState::Loading
        );
        if !renewable {
            debug!("Ignoring token refresh outside a signed-in session");
            return false;
        }

        let Some(refresh) = self.store.get(&self.keys.refresh_token) else {
            debug!("No refresh token to renew with");
            self.set_error(AuthError::TokenExpired.user_message());
            return false;
        };

        match self.api.refresh_token(&refresh).await {
            Ok(pair) => {
                self.store.set(&self.keys.access_token, &pair.access_token);
                if let Some(rotated) = pair.refresh_token {
                    self.store.set(&self.keys.refresh_token, &rotated);
                }
                debug!("Access token refreshed");
                true
            }
            Err(e) => {
                report(&e, "Token refresh failed");
                self.set_error(e.user_message());
                false
            }
        }
    }

    /// Drop the session after a credential was found invalid or expired.
    #[instrument(skip(self))]
    pub fn invalidate(&self, reason: &str) {
        info!("Session invalidated");
        self.clear_credentials();
        self.set_error(reason.to_string());
        self.set_state(SessionState::Unauthenticated);
    }

    /// Re-fetch the current user from the backend.
    ///
    /// A failure invalidates the session. Outside an authenticated session
    /// this returns `false` without touching the state.
    #[instrument(skip(self))]
    pub async fn reload_user(&self) -> bool {
        if !self.is_authenticated() {
            debug!("Ignoring user reload outside an authenticated session");
            return false;
        }

        let result = async {
            let token = self.access_token()?;
            let actor = self.api.me(&token).await?;
            ensure_active(&actor)?;
            Ok::<_, AuthError>(actor)
        }
        .await;

        match result {
            Ok(actor) => {
                debug!(actor_id = %actor.id, "User reloaded");
                self.set_state(SessionState::Authenticated(Arc::new(actor)));
                true
            }
            Err(e) => {
                report(&e, "User reload failed");
                self.fail_closed(&e);
                false
            }
        }
    }

    /// Merge locally known changes into the current actor.
    ///
    /// No round trip; a no-op unless authenticated.
    pub fn update_user(&self, update: ActorUpdate) {
        let updated = self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(actor) => {
                *actor = Arc::new(actor.merge(update));
                true
            }
            _ => false,
        });

        if !updated {
            debug!("Ignoring user update outside an authenticated session");
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn access_token(&self) -> AuthResult<String> {
        self.store
            .get(&self.keys.access_token)
            .ok_or(AuthError::TokenExpired)
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn set_error(&self, message: String) {
        *self
            .error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(message);
    }

    fn clear_error(&self) {
        *self
            .error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn clear_credentials(&self) {
        self.store.remove(&self.keys.access_token);
        self.store.remove(&self.keys.refresh_token);
    }

    fn fail_closed(&self, error: &AuthError) {
        self.clear_credentials();
        self.set_error(error.user_message());
        self.set_state(SessionState::Unauthenticated);
    }
}

fn report(err: &AuthError, context: &str) {
    if err.is_server_error() {
        error!(error = %err, "{}", context);
    } else {
        warn!(error = %err, "{}", context);
    }
}

fn ensure_active(actor: &Actor) -> AuthResult<()> {
    match AuthError::from_account_status(actor.account_status()) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LoginResponse, TokenPair};
    use crate::store::MemoryCredentialStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend fake that accepts "ayse"/"secret" and a single token pair.
    #[derive(Default)]
    struct FakeApi {
        logout_fails: bool,
        logout_calls: AtomicUsize,
        disabled: bool,
    }

    fn user(disabled: bool) -> Actor {
        let mut actor = Actor::new("7")
            .with_username("ayse")
            .with_roles([Role::User])
            .with_permissions([Permission::Approval]);
        actor.enabled = !disabled;
        actor
    }

    #[async_trait]
    impl AuthApi for FakeApi {
        async fn login(&self, username: &str, password: &str) -> AuthResult<LoginResponse> {
            if username == "ayse" && password == "secret" {
                Ok(LoginResponse {
                    access_token: "access-1".to_string(),
                    refresh_token: "refresh-1".to_string(),
                    user: user(self.disabled),
                })
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn logout(&self, _access_token: &str) -> AuthResult<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            if self.logout_fails {
                Err(AuthError::Api {
                    status: 503,
                    message: "down".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn me(&self, access_token: &str) -> AuthResult<Actor> {
            match access_token {
                "access-1" | "access-2" => Ok(user(self.disabled)),
                _ => Err(AuthError::Unauthorized("bad token".to_string())),
            }
        }

        async fn refresh_token(&self, refresh_token: &str) -> AuthResult<TokenPair> {
            if refresh_token == "refresh-1" {
                Ok(TokenPair {
                    access_token: "access-2".to_string(),
                    refresh_token: Some("refresh-2".to_string()),
                })
            } else {
                Err(AuthError::Unauthorized("bad refresh token".to_string()))
            }
        }

        async fn validate_token(&self, access_token: &str) -> AuthResult<()> {
            self.me(access_token).await.map(|_| ())
        }
    }

    fn session_with(api: FakeApi) -> (Session, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(Arc::new(api), store.clone(), StorageKeys::default());
        (session, store)
    }

    #[tokio::test]
    async fn test_initialize_without_token() {
        let (session, _) = session_with(FakeApi::default());
        assert_eq!(session.state(), SessionState::Unloaded);
        assert!(session.is_loading());

        assert!(!session.initialize().await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_initialize_restores_valid_token() {
        let (session, store) = session_with(FakeApi::default());
        store.set("accessToken", "access-1");

        assert!(session.initialize().await);
        assert_eq!(session.actor().unwrap().id, "7");
    }

    #[tokio::test]
    async fn test_initialize_fails_closed_on_bad_token() {
        let (session, store) = session_with(FakeApi::default());
        store.set("accessToken", "stale");
        store.set("refreshToken", "refresh-1");

        assert!(!session.initialize().await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.is_empty());
        assert!(session.error().is_some());
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let (session, store) = session_with(FakeApi::default());
        assert!(!session.initialize().await);

        store.set("accessToken", "access-1");
        assert!(!session.initialize().await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_success_persists_tokens() {
        let (session, store) = session_with(FakeApi::default());

        assert!(session.login("ayse", "secret").await);
        assert!(session.is_authenticated());
        assert!(session.has_role(Role::User));
        assert!(session.has_permission(Permission::Approval));
        assert_eq!(store.get("accessToken").as_deref(), Some("access-1"));
        assert_eq!(store.get("refreshToken").as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_login_rejects_empty_fields() {
        let (session, store) = session_with(FakeApi::default());

        assert!(!session.login("  ", "secret").await);
        assert_eq!(
            session.error().as_deref(),
            Some("Username and password are required")
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_disabled_account() {
        let (session, store) = session_with(FakeApi {
            disabled: true,
            ..Default::default()
        });

        assert!(!session.login("ayse", "secret").await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert_eq!(session.error().as_deref(), Some("This account is disabled"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (session, _) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);

        assert!(!session.login("ayse", "wrong").await);
        assert!(session.is_authenticated());
        assert_eq!(session.error().as_deref(), Some("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (session, store) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);

        session.logout().await;
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.is_empty());

        session.logout().await;
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_logout_survives_remote_failure() {
        let api = Arc::new(FakeApi {
            logout_fails: true,
            ..Default::default()
        });
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(api.clone(), store.clone(), StorageKeys::default());

        assert!(session.login("ayse", "secret").await);
        session.logout().await;

        assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);
        assert!(store.is_empty());
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let (session, store) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);

        assert!(session.refresh_token().await);
        assert_eq!(store.get("accessToken").as_deref(), Some("access-2"));
        assert_eq!(store.get("refreshToken").as_deref(), Some("refresh-2"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_state_to_caller() {
        let (session, store) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);
        store.set("refreshToken", "revoked");

        assert!(!session.refresh_token().await);
        assert!(session.is_authenticated());
        assert!(session.error().is_some());

        session.invalidate("Your session has expired");
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let (session, store) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);
        store.remove("refreshToken");

        assert!(!session.refresh_token().await);
        assert_eq!(store.get("accessToken").as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_initialize_without_access_token_drops_stray_refresh_token() {
        let (session, store) = session_with(FakeApi::default());
        store.set("refreshToken", "refresh-1");

        assert!(!session.initialize().await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_refused_when_signed_out() {
        let (session, store) = session_with(FakeApi::default());
        assert!(!session.initialize().await);
        store.set("refreshToken", "refresh-1");

        assert!(!session.refresh_token().await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.get("accessToken").is_none());
        assert_eq!(store.get("refreshToken").as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_reload_user_before_initialize_keeps_session_restorable() {
        let (session, store) = session_with(FakeApi::default());

        assert!(!session.reload_user().await);
        assert_eq!(session.state(), SessionState::Unloaded);

        store.set("accessToken", "access-1");
        assert!(session.initialize().await);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_update_user_merges() {
        let (session, _) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);
        let before = session.actor().unwrap();

        session.update_user(ActorUpdate::display_name("Ayşe Y."));

        let after = session.actor().unwrap();
        assert_eq!(after.display_name.as_deref(), Some("Ayşe Y."));
        assert_eq!(after.roles, before.roles);
        assert!(before.display_name.is_none());
    }

    #[tokio::test]
    async fn test_update_user_noop_when_signed_out() {
        let (session, _) = session_with(FakeApi::default());
        session.update_user(ActorUpdate::display_name("Nobody"));
        assert_eq!(session.state(), SessionState::Unloaded);
    }

    #[tokio::test]
    async fn test_reload_user_with_revoked_token_fails_closed() {
        let (session, store) = session_with(FakeApi::default());
        assert!(session.login("ayse", "secret").await);
        store.set("accessToken", "revoked");

        assert!(!session.reload_user().await);
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (session, _) = session_with(FakeApi::default());
        let mut rx = session.subscribe();

        assert!(session.login("ayse", "secret").await);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        session.logout().await;
        assert_eq!(*rx.borrow_and_update(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_state_helpers() {
        let actor = Arc::new(Actor::new("1"));
        assert!(SessionState::Unloaded.is_pending());
        assert!(SessionState::Loading.is_pending());
        assert!(!SessionState::Unauthenticated.is_pending());
        assert_eq!(
            SessionState::Authenticated(actor.clone()).actor().map(|a| a.id.as_str()),
            Some("1")
        );
        assert!(SessionState::Unauthenticated.actor().is_none());
    }
}
