//! Credential persistence.
//!
//! The session sees a single key-value port, [`CredentialStore`]. Deployment
//! targets that keep the token in two places (durable storage plus a cookie
//! the server can read) wrap both in a [`MirroredCredentialStore`], which
//! writes and clears them together.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::AuthConfig;

/// Durable key-value storage for credentials.
pub trait CredentialStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str);
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        read(&self.values).len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        read(&self.values).is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        write(&self.values).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        write(&self.values).remove(key);
    }
}

/// Cookie mirror of the credentials, for requests the server evaluates itself.
///
/// Keeps the current cookie values and renders the `Cookie` request header
/// and the `Set-Cookie` lines a response would carry.
#[derive(Debug)]
pub struct CookieCredentialStore {
    cookies: RwLock<BTreeMap<String, String>>,
    path: String,
    max_age_secs: u64,
    secure: bool,
}

impl CookieCredentialStore {
    /// Create a cookie store with the given path and lifetime.
    pub fn new(path: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            cookies: RwLock::new(BTreeMap::new()),
            path: path.into(),
            max_age_secs,
            secure: true,
        }
    }

    /// Create a cookie store from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.cookie_path.clone(), config.cookie_max_age_secs)
            .with_secure(config.base_url.starts_with("https://"))
    }

    /// Set the `Secure` attribute.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// `Cookie` request header with every stored cookie, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = read(&self.cookies);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// `Set-Cookie` value that stores `key`, if it is present.
    pub fn set_cookie(&self, key: &str) -> Option<String> {
        let cookies = read(&self.cookies);
        let value = cookies.get(key)?;
        Some(format!(
            "{}={}; Path={}; Max-Age={}; SameSite=Lax{}",
            key,
            value,
            self.path,
            self.max_age_secs,
            if self.secure { "; Secure" } else { "" }
        ))
    }

    /// `Set-Cookie` value that deletes `key` in the browser.
    pub fn clear_cookie(&self, key: &str) -> String {
        format!("{}=; Path={}; Max-Age=0; SameSite=Lax", key, self.path)
    }
}

impl CredentialStore for CookieCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.cookies).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        write(&self.cookies).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        write(&self.cookies).remove(key);
    }
}

/// Fans every write and removal out to a primary store and a mirror.
///
/// Reads prefer the primary and fall back to the mirror (e.g. a cookie set
/// by the server before the primary store was populated).
#[derive(Debug)]
pub struct MirroredCredentialStore<P, M> {
    primary: P,
    mirror: M,
}

impl<P: CredentialStore, M: CredentialStore> MirroredCredentialStore<P, M> {
    /// Combine a primary store with a mirror.
    pub fn new(primary: P, mirror: M) -> Self {
        Self { primary, mirror }
    }

    /// Get the primary store.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// Get the mirror store.
    pub fn mirror(&self) -> &M {
        &self.mirror
    }
}

impl<P: CredentialStore, M: CredentialStore> CredentialStore for MirroredCredentialStore<P, M> {
    fn get(&self, key: &str) -> Option<String> {
        self.primary.get(key).or_else(|| self.mirror.get(key))
    }

    fn set(&self, key: &str, value: &str) {
        self.primary.set(key, value);
        self.mirror.set(key, value);
    }

    fn remove(&self, key: &str) {
        self.primary.remove(key);
        self.mirror.remove(key);
    }
}
