//! Auth backend configuration.
//!
//! Holds the backend URL, request timeout and the names under which
//! credentials are persisted. Configuration is loaded from environment
//! variables with defaults for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value is empty.
    #[error("Missing required configuration value: {0}")]
    Missing(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Auth backend and credential-storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the REST backend (e.g., "https://api.freightdesk.io").
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Storage key of the access token.
    pub access_token_key: String,

    /// Storage key of the refresh token.
    pub refresh_token_key: String,

    /// Path attribute of the mirrored credential cookies.
    pub cookie_path: String,

    /// Max-Age attribute of the mirrored credential cookies, in seconds.
    pub cookie_max_age_secs: u64,
}

impl Default for AuthConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            access_token_key: "accessToken".to_string(),
            refresh_token_key: "refreshToken".to_string(),
            cookie_path: "/".to_string(),
            cookie_max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FREIGHTDESK_API_URL`: backend URL (default: http://localhost:8080/api)
    /// - `FREIGHTDESK_API_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `FREIGHTDESK_ACCESS_TOKEN_KEY`: access token storage key (default: accessToken)
    /// - `FREIGHTDESK_REFRESH_TOKEN_KEY`: refresh token storage key (default: refreshToken)
    /// - `FREIGHTDESK_COOKIE_PATH`: cookie path (default: /)
    /// - `FREIGHTDESK_COOKIE_MAX_AGE_SECS`: cookie lifetime (default: 7 days)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("FREIGHTDESK_API_URL").unwrap_or(default.base_url),
            timeout_secs: std::env::var("FREIGHTDESK_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            access_token_key: std::env::var("FREIGHTDESK_ACCESS_TOKEN_KEY")
                .unwrap_or(default.access_token_key),
            refresh_token_key: std::env::var("FREIGHTDESK_REFRESH_TOKEN_KEY")
                .unwrap_or(default.refresh_token_key),
            cookie_path: std::env::var("FREIGHTDESK_COOKIE_PATH").unwrap_or(default.cookie_path),
            cookie_max_age_secs: std::env::var("FREIGHTDESK_COOKIE_MAX_AGE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.cookie_max_age_secs),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("FREIGHTDESK_API_URL".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "FREIGHTDESK_API_URL".to_string(),
                message: format!("expected an http(s) URL, got {}", self.base_url),
            });
        }
        if self.access_token_key.is_empty() || self.refresh_token_key.is_empty() {
            return Err(ConfigError::Missing("token storage key".to_string()));
        }
        if self.access_token_key == self.refresh_token_key {
            return Err(ConfigError::InvalidValue {
                key: "FREIGHTDESK_REFRESH_TOKEN_KEY".to_string(),
                message: "must differ from the access token key".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "FREIGHTDESK_API_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
