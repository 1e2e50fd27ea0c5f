//! Auth backend client.
//!
//! [`AuthApi`] is the seam between the session and the REST backend. The
//! HTTP implementation talks to the following endpoints:
//!
//! ```text
//! POST /auth/login           {username, password} -> {accessToken, refreshToken, user}
//! POST /auth/logout          bearer                -> 2xx
//! GET  /auth/me              bearer                -> user
//! POST /auth/refresh-token   {refreshToken}        -> {accessToken, refreshToken?} | "token"
//! POST /auth/validate-token  bearer                -> 2xx
//! ```

use async_trait::async_trait;
use freightdesk_rbac::Actor;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Remote auth operations used by the session.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange username and password for tokens and the user.
    async fn login(&self, username: &str, password: &str) -> AuthResult<LoginResponse>;

    /// Invalidate the access token on the backend.
    async fn logout(&self, access_token: &str) -> AuthResult<()>;

    /// Fetch the user the access token belongs to.
    async fn me(&self, access_token: &str) -> AuthResult<Actor>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> AuthResult<TokenPair>;

    /// Check that the access token is still accepted.
    async fn validate_token(&self, access_token: &str) -> AuthResult<()>;
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password (sent over TLS only).
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token for silent renewal.
    pub refresh_token: String,
    /// The signed-in user.
    pub user: Actor,
}

/// Refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token being exchanged.
    pub refresh_token: String,
}

/// Tokens returned by a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// New access token.
    pub access_token: String,
    /// Rotated refresh token, when the backend rotates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Parse a refresh response body.
    ///
    /// Accepts a token object, a JSON string, or a bare token as plain text.
    pub fn from_body(body: &str) -> AuthResult<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(AuthError::InvalidResponse("empty refresh response".to_string()));
        }

        if let Ok(pair) = serde_json::from_str::<TokenPair>(trimmed) {
            return Ok(pair);
        }
        if let Ok(token) = serde_json::from_str::<String>(trimmed) {
            return Ok(Self {
                access_token: token,
                refresh_token: None,
            });
        }
        if trimmed.starts_with('{') || trimmed.contains(char::is_whitespace) {
            return Err(AuthError::InvalidResponse(format!(
                "unrecognized refresh response: {}",
                trimmed
            )));
        }

        Ok(Self {
            access_token: trimmed.to_string(),
            refresh_token: None,
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// HTTP implementation of [`AuthApi`].
#[derive(Clone)]
pub struct HttpAuthClient {
    /// HTTP client instance.
    client: Client,

    /// Backend configuration.
    config: AuthConfig,
}

impl std::fmt::Debug for HttpAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl HttpAuthClient {
    /// Create a new client for the configured backend.
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn bearer(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", access_token))
    }

    /// Turn a non-success response into an error.
    async fn check_status(&self, response: Response) -> AuthResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        let err = if status == StatusCode::UNAUTHORIZED {
            AuthError::Unauthorized(message)
        } else {
            AuthError::Api {
                status: status.as_u16(),
                message,
            }
        };

        if err.is_server_error() {
            error!("Auth backend error ({}): {}", status.as_u16(), err);
        } else {
            warn!("Auth backend rejected the request ({}): {}", status.as_u16(), err);
        }
        Err(err)
    }

    async fn parse_json<T>(&self, response: Response) -> AuthResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> AuthResult<LoginResponse> {
        debug!("Logging in");

        let url = self.config.url("/auth/login");
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;

        // A 401 here means bad username/password, not a stale token
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }

        self.parse_json(response).await
    }

    #[instrument(skip(self, access_token))]
    async fn logout(&self, access_token: &str) -> AuthResult<()> {
        debug!("Logging out");

        let url = self.config.url("/auth/logout");
        let response = self
            .bearer(self.client.post(&url), access_token)
            .send()
            .await?;

        self.check_status(response).await.map(|_| ())
    }

    #[instrument(skip(self, access_token))]
    async fn me(&self, access_token: &str) -> AuthResult<Actor> {
        debug!("Fetching current user");

        let url = self.config.url("/auth/me");
        let response = self
            .bearer(self.client.get(&url), access_token)
            .send()
            .await?;

        self.parse_json(response).await
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        debug!("Refreshing access token");

        let url = self.config.url("/auth/refresh-token");
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = self.check_status(response).await?;
        let text = response.text().await?;

        TokenPair::from_body(&text)
    }

    #[instrument(skip(self, access_token))]
    async fn validate_token(&self, access_token: &str) -> AuthResult<()> {
        debug!("Validating access token");

        let url = self.config.url("/auth/validate-token");
        let response = self
            .bearer(self.client.post(&url), access_token)
            .send()
            .await?;

        self.check_status(response).await.map(|_| ())
    }
}
