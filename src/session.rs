//! Session credential storage.
//!
//! The transport only ever reads the access token to attach a bearer header,
//! and calls [`SessionProvider::clear`] when the server classifies a request
//! as unauthorized. Login flows live outside this crate and mutate the
//! provider directly.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An access token plus its expiry instant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Read/clear access to the current credential, injectable per client.
pub trait SessionProvider: Send + Sync {
    /// Returns the current access token, or `None` when logged out or expired.
    fn access_token(&self) -> Option<String>;

    /// Drops the stored credential. Invoked once per unauthorized response.
    fn clear(&self);
}

/// In-memory [`SessionProvider`] backing the default client.
#[derive(Default)]
pub struct MemorySession {
    inner: RwLock<Option<Credential>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a credential, replacing any previous one.
    pub fn set(&self, credential: Credential) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(credential);
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }
}

impl SessionProvider for MemorySession {
    fn access_token(&self) -> Option<String> {
        let guard = self.inner.read().ok()?;
        let credential = guard.as_ref()?;
        if credential.access_token.is_empty() || credential.expires_at <= Utc::now() {
            return None;
        }
        Some(credential.access_token.clone())
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}
