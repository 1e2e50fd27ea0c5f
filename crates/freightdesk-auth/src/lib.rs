//! # FreightDesk Authentication
//!
//! This crate owns the signed-in session of the FreightDesk back office.
//!
//! ## Overview
//!
//! The freightdesk-auth crate handles:
//! - **Session**: The `Unloaded → Loading → Authenticated | Unauthenticated` lifecycle
//! - **Client**: The REST auth backend (`/auth/login`, `/auth/me`, ...)
//! - **Store**: A single credential-persistence port with memory, cookie and mirrored adapters
//! - **Tokens**: Local JWT expiry check before restoring a session (optional)
//!
//! ## Features
//!
//! - `jwt` (default): skip the validation round-trip for locally expired JWTs and refresh instead
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use freightdesk_auth::{AuthConfig, MemoryCredentialStore, Session};
//! use freightdesk_rbac::Role;
//!
//! async fn start() -> Result<(), freightdesk_auth::AuthError> {
//!     let session = Arc::new(Session::http(
//!         AuthConfig::from_env(),
//!         Arc::new(MemoryCredentialStore::new()),
//!     )?);
//!
//!     if !session.initialize().await && !session.login("ayse", "secret").await {
//!         eprintln!("{}", session.error().unwrap_or_default());
//!     }
//!
//!     if session.has_role(Role::Admin) {
//!         // ...
//!     }
//!
//!     session.logout().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Session operations never return errors. Remote failures become a `false`
//! result plus a message in `Session::error`, and the session fails closed.

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
#[cfg(feature = "jwt")]
pub mod token;

// Re-export main types
pub use client::{AuthApi, HttpAuthClient, LoginRequest, LoginResponse, TokenPair};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult};
pub use session::{Session, SessionState, StorageKeys};
pub use store::{
    CookieCredentialStore, CredentialStore, MemoryCredentialStore, MirroredCredentialStore,
};
