//! End-to-end tests for the session against a mocked auth backend.
//!
//! The backend is simulated with wiremock so the tests exercise the real
//! HTTP client, the JSON wire format and the credential stores together.
//!
//! Covered flows:
//! 1. login → logout round trip (store and cookie mirror end up empty)
//! 2. rejected credentials (401)
//! 3. logout while the backend is unreachable
//! 4. session restore from a persisted token
//! 5. restore with a locally expired JWT (silent refresh)
//! 6. malformed user payloads fail closed

use std::sync::Arc;
use std::time::Duration;

use freightdesk_auth::{
    AuthConfig, CookieCredentialStore, CredentialStore, MemoryCredentialStore,
    MirroredCredentialStore, Session, SessionState,
};
use freightdesk_rbac::{Department, Permission, Role};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Store = MirroredCredentialStore<MemoryCredentialStore, CookieCredentialStore>;

/// Test fixture providing a mock backend and a session wired to it.
struct TestFixture {
    /// Mock auth backend.
    server: MockServer,
    /// Persisted credentials (durable store + cookie mirror).
    store: Arc<Store>,
    /// Session under test.
    session: Session,
}

impl TestFixture {
    /// Create a fixture with the default request timeout.
    async fn new() -> Self {
        Self::with_timeout(10).await
    }

    /// Create a fixture with a custom request timeout.
    async fn with_timeout(timeout_secs: u64) -> Self {
        let server = MockServer::start().await;

        let config = AuthConfig {
            base_url: server.uri(),
            timeout_secs,
            ..Default::default()
        };

        let store = Arc::new(MirroredCredentialStore::new(
            MemoryCredentialStore::new(),
            CookieCredentialStore::from_config(&config),
        ));

        let session = Session::http(config, store.clone()).expect("valid test config");

        Self {
            server,
            store,
            session,
        }
    }

    /// Assert that nothing is persisted anywhere.
    fn assert_store_empty(&self) {
        assert!(self.store.primary().is_empty());
        assert!(self.store.mirror().cookie_header().is_none());
    }

    /// Mount a successful login for ayse/secret.
    async fn mount_login_ok(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "username": "ayse",
                "password": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "access-1",
                "refreshToken": "refresh-1",
                "user": user_json()
            })))
            .mount(&self.server)
            .await;
    }
}

fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "username": "ayse",
        "email": "ayse@example.com",
        "roles": ["USER"],
        "departments": ["FINANCE"],
        "permissions": ["APPROVAL", "CHECK_OPERATION"],
        "connectionId": null,
        "enabled": true,
        "accountNonLocked": true,
        "accountNonExpired": true,
        "credentialsNonExpired": true
    })
}

// =============================================================================
// Login / logout
// =============================================================================

#[tokio::test]
async fn test_login_then_logout_round_trip() {
    let fixture = TestFixture::new().await;
    fixture.mount_login_ok().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fixture.server)
        .await;

    assert!(fixture.session.login("ayse", "secret").await);
    assert!(fixture.session.has_role(Role::User));
    assert!(fixture.session.has_permission(Permission::CheckOperation));
    assert_eq!(
        fixture.store.mirror().cookie_header().as_deref(),
        Some("accessToken=access-1; refreshToken=refresh-1")
    );

    let actor = fixture.session.actor().expect("signed in");
    assert!(actor.departments.contains(&Department::Finance));
    assert_eq!(actor.id, "7");

    fixture.session.logout().await;

    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    fixture.assert_store_empty();
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Bad credentials"
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.login("bad", "creds").await);
    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    assert_eq!(
        fixture.session.error().as_deref(),
        Some("Invalid username or password")
    );
    fixture.assert_store_empty();
}

#[tokio::test]
async fn test_login_surfaces_backend_message() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "message": "Too many attempts, try again later"
        })))
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.login("ayse", "secret").await);
    assert_eq!(
        fixture.session.error().as_deref(),
        Some("Too many attempts, try again later")
    );
}

#[tokio::test]
async fn test_logout_when_backend_unreachable() {
    let fixture = TestFixture::with_timeout(1).await;
    fixture.mount_login_ok().await;

    // Logout never answers in time: the client gives up with a transport error
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&fixture.server)
        .await;

    assert!(fixture.session.login("ayse", "secret").await);

    fixture.session.logout().await;

    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    fixture.assert_store_empty();

    // second logout has no token left, so no remote call and no error
    fixture.session.logout().await;
    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    fixture.assert_store_empty();
}

#[tokio::test]
async fn test_login_with_locked_account() {
    let fixture = TestFixture::new().await;

    let mut user = user_json();
    user["accountNonLocked"] = serde_json::json!(false);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "user": user
        })))
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.login("ayse", "secret").await);
    assert_eq!(fixture.session.error().as_deref(), Some("This account is locked"));
    fixture.assert_store_empty();
}

#[tokio::test]
async fn test_login_with_unknown_role_fails_closed() {
    let fixture = TestFixture::new().await;

    let mut user = user_json();
    user["roles"] = serde_json::json!(["USER", "SUPERADMIN"]);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "user": user
        })))
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.login("ayse", "secret").await);
    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    fixture.assert_store_empty();
}

// =============================================================================
// Restore
// =============================================================================

#[tokio::test]
async fn test_restore_from_persisted_token() {
    let fixture = TestFixture::new().await;
    fixture.store.set("accessToken", "access-1");

    Mock::given(method("POST"))
        .and(path("/auth/validate-token"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&fixture.server)
        .await;

    assert!(fixture.session.initialize().await);
    assert!(fixture.session.is_authenticated());
    assert!(fixture
        .session
        .is_authorized(&[Role::User], &[Permission::Approval]));
}

#[tokio::test]
async fn test_restore_with_rejected_token() {
    let fixture = TestFixture::new().await;
    fixture.store.set("accessToken", "access-old");
    fixture.store.set("refreshToken", "refresh-old");

    Mock::given(method("POST"))
        .and(path("/auth/validate-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.initialize().await);
    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    fixture.assert_store_empty();
}

#[tokio::test]
async fn test_restore_when_backend_errors() {
    let fixture = TestFixture::new().await;
    fixture.store.set("accessToken", "access-1");

    Mock::given(method("POST"))
        .and(path("/auth/validate-token"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.initialize().await);
    assert!(fixture.session.actor().is_none());
    fixture.assert_store_empty();
}

#[cfg(feature = "jwt")]
#[tokio::test]
async fn test_restore_refreshes_expired_jwt() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let fixture = TestFixture::new().await;

    let expired = encode(
        &Header::default(),
        &serde_json::json!({ "sub": "7", "exp": 1_000_000_000 }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap();
    fixture.store.set("accessToken", &expired);
    fixture.store.set("refreshToken", "refresh-1");

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(serde_json::json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "access-2"
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/validate-token"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&fixture.server)
        .await;

    assert!(fixture.session.initialize().await);
    assert_eq!(fixture.store.get("accessToken").as_deref(), Some("access-2"));
    // refresh token was not rotated
    assert_eq!(fixture.store.get("refreshToken").as_deref(), Some("refresh-1"));
}

#[cfg(feature = "jwt")]
#[tokio::test]
async fn test_restore_with_expired_jwt_and_failed_refresh() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let fixture = TestFixture::new().await;

    let expired = encode(
        &Header::default(),
        &serde_json::json!({ "sub": "7", "exp": 1_000_000_000 }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap();
    fixture.store.set("accessToken", &expired);
    fixture.store.set("refreshToken", "refresh-1");

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&fixture.server)
        .await;

    // no validation round-trip for a token known to be expired
    Mock::given(method("POST"))
        .and(path("/auth/validate-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.server)
        .await;

    assert!(!fixture.session.initialize().await);
    assert_eq!(fixture.session.state(), SessionState::Unauthenticated);
    fixture.assert_store_empty();
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_accepts_bare_token_body() {
    let fixture = TestFixture::new().await;
    fixture.mount_login_ok().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("access-3"))
        .mount(&fixture.server)
        .await;

    assert!(fixture.session.login("ayse", "secret").await);
    assert!(fixture.session.refresh_token().await);
    assert_eq!(fixture.store.get("accessToken").as_deref(), Some("access-3"));
    assert_eq!(
        fixture.store.mirror().get("accessToken").as_deref(),
        Some("access-3")
    );
}

#[tokio::test]
async fn test_reload_user_picks_up_new_permissions() {
    let fixture = TestFixture::new().await;
    fixture.mount_login_ok().await;

    assert!(fixture.session.login("ayse", "secret").await);
    assert!(!fixture.session.has_permission(Permission::Setting));

    let mut updated = user_json();
    updated["permissions"] = serde_json::json!(["APPROVAL", "SETTING"]);

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .mount(&fixture.server)
        .await;

    assert!(fixture.session.reload_user().await);
    assert!(fixture.session.has_permission(Permission::Setting));
    assert!(!fixture.session.has_permission(Permission::CheckOperation));
}
