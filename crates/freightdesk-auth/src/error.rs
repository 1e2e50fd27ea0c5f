//! Error types for authentication operations
//!
//! This module defines the errors raised while talking to the auth backend
//! and while checking the account returned by it. The session never lets
//! them escape: it turns them into a boolean result plus [`AuthError::user_message`].

use freightdesk_rbac::AccountStatus;
use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password rejected by the backend
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username or password left empty
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Bearer token rejected by the backend
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Token expired before it was used
    #[error("Token has expired")]
    TokenExpired,

    /// Account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Account is locked
    #[error("Account is locked")]
    AccountLocked,

    /// Account has expired
    #[error("Account has expired")]
    AccountExpired,

    /// Password has expired
    #[error("Credentials have expired")]
    CredentialsExpired,

    /// Transport failure (connection refused, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend returned a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// Backend returned a body that could not be understood
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Map a failing account-status check to its error.
    ///
    /// Returns `None` for an active account.
    pub fn from_account_status(status: AccountStatus) -> Option<Self> {
        match status {
            AccountStatus::Active => None,
            AccountStatus::Disabled => Some(AuthError::AccountDisabled),
            AccountStatus::Locked => Some(AuthError::AccountLocked),
            AccountStatus::Expired => Some(AuthError::AccountExpired),
            AccountStatus::CredentialsExpired => Some(AuthError::CredentialsExpired),
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Rejected credentials, stale tokens and locked accounts are expected
    /// and are logged as warnings.
    pub fn is_server_error(&self) -> bool {
        match self {
            AuthError::Config(_) | AuthError::InvalidResponse(_) => true,
            AuthError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Human-readable message shown next to the login form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid username or password".to_string(),
            AuthError::MissingCredentials(what) => what.clone(),
            AuthError::Unauthorized(_) | AuthError::TokenExpired => {
                "Your session has expired, please sign in again".to_string()
            }
            AuthError::AccountDisabled => "This account is disabled".to_string(),
            AuthError::AccountLocked => "This account is locked".to_string(),
            AuthError::AccountExpired => "This account has expired".to_string(),
            AuthError::CredentialsExpired => "Your password has expired".to_string(),
            AuthError::Network(_) => "Could not reach the server, please try again".to_string(),
            AuthError::Api { message, .. } if !message.is_empty() => message.clone(),
            AuthError::Api { .. } | AuthError::InvalidResponse(_) | AuthError::Config(_) => {
                "Unexpected server error".to_string()
            }
        }
    }
}
