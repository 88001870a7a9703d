use crate::storage::StorageState;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "access_token";
/// Storage key of the role string.
pub const ROLE_KEY: &str = "user_role";

/// Session
///
/// A point-in-time copy of the stored credentials. `role` is only populated
/// while a token is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// CredentialStore
///
/// The narrow facade over the key-value backend that holds the session. It is
/// cheap to clone and is handed explicitly to the guards, the credential
/// interceptor and the auth service; nothing else reads the two keys.
///
/// Every method is synchronous and infallible from the caller's point of view:
/// a missing entry is `None`, and backend write failures are logged.
#[derive(Clone)]
pub struct CredentialStore {
    backend: StorageState,
}

impl CredentialStore {
    /// new
    ///
    /// Wraps a backend. A role left behind without a token (a half-cleared
    /// session) is purged here, so `role()` never outlives the token it was
    /// issued with.
    pub fn new(backend: StorageState) -> Self {
        let store = Self { backend };
        if store.backend.get(TOKEN_KEY).is_none() && store.backend.get(ROLE_KEY).is_some() {
            tracing::debug!("purging orphaned role entry");
            store.remove(ROLE_KEY);
        }
        store
    }

    pub fn set_token(&self, token: &str) {
        self.write(TOKEN_KEY, token);
    }

    pub fn token(&self) -> Option<String> {
        self.backend.get(TOKEN_KEY)
    }

    pub fn clear_token(&self) {
        self.remove(TOKEN_KEY);
    }

    pub fn set_role(&self, role: &str) {
        self.write(ROLE_KEY, role);
    }

    pub fn role(&self) -> Option<String> {
        self.backend.get(ROLE_KEY)
    }

    /// Removes both entries (logout).
    pub fn clear(&self) {
        self.remove(TOKEN_KEY);
        self.remove(ROLE_KEY);
    }

    /// Reads both entries and drops a role that has no token next to it.
    pub fn snapshot(&self) -> Session {
        let token = self.token();
        let role = token.as_ref().and_then(|_| self.role());
        Session { token, role }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            tracing::error!(key, error = %e, "failed to persist credential entry");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::error!(key, error = %e, "failed to remove credential entry");
        }
    }
}
