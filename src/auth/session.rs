//! Process-wide session state.
//!
//! `SessionStore` is the single source of truth for "who is logged in".
//! It rehydrates once from durable storage at startup, persists on every
//! mutation, and publishes changes through a watch channel so read-only
//! consumers (the route guard, the UI) observe updates immediately.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use super::storage::SessionStorage;
use crate::models::User;

/// The durable record of the current identity: `{token, user}`.
///
/// `is_authenticated` is derived from the token on every read, never
/// stored, so the flag cannot diverge from the token's presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// Sole writer of session data. Everything else subscribes.
pub struct SessionStore {
    tx: watch::Sender<Session>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Rehydrate from durable storage. A missing or unreadable entry
    /// starts an empty (unauthenticated) session.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let initial = storage.load().unwrap_or_default();
        let (tx, _rx) = watch::channel(initial);
        Self { tx, storage }
    }

    /// Store the credential token. Any string is accepted; whether it
    /// authenticates is decided by `is_authenticated` on read.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.mutate(|session| session.token = Some(token));
    }

    /// Replace the stored profile wholesale. No merge with prior data.
    pub fn set_user(&self, user: User) {
        self.mutate(|session| session.user = Some(user));
    }

    /// Clear token and user together. Purely local, no server call.
    pub fn logout(&self) {
        self.mutate(|session| {
            session.token = None;
            session.user = None;
        });
    }

    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        self.tx.send_modify(f);
        self.persist();
    }

    // In-memory state stays authoritative when the durable write fails;
    // the change is simply lost on the next restart.
    fn persist(&self) {
        let session = self.tx.borrow().clone();
        let result = if session.is_empty() {
            self.storage.clear()
        } else {
            self.storage.save(&session)
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session, continuing in memory only");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    pub fn session(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemorySessionStorage;
    use anyhow::Result;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "analyst@example.com".to_string(),
            name: "Analyst".to_string(),
            is_active: true,
            is_superuser: false,
            phone_number: None,
            bio: None,
            profession: None,
            image_url: None,
        }
    }

    /// Storage whose writes always fail, for the silent-degradation path.
    struct FailingStorage;

    impl SessionStorage for FailingStorage {
        fn load(&self) -> Option<Session> {
            None
        }
        fn save(&self, _session: &Session) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
        fn clear(&self) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    fn memory_store() -> SessionStore {
        SessionStore::open(Arc::new(MemorySessionStorage::new()))
    }

    #[test]
    fn test_starts_empty() {
        let store = memory_store();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_set_token_authenticates() {
        let store = memory_store();
        store.set_token("abc");
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_token_does_not_authenticate() {
        let store = memory_store();
        store.set_token("");
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_logout_clears_everything() {
        let store = memory_store();
        store.set_token("abc");
        store.set_user(sample_user());
        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_authenticated_tracks_most_recent_mutation() {
        // For any call sequence, authenticated iff the latest token-affecting
        // call was set_token with a non-empty value.
        let store = memory_store();
        store.set_token("a");
        store.logout();
        store.set_token("b");
        store.set_token("c");
        assert!(store.is_authenticated());
        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
        store.set_token("d");
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_set_user_replaces_wholesale() {
        let store = memory_store();
        let mut first = sample_user();
        first.bio = Some("first bio".to_string());
        store.set_user(first);

        let second = sample_user();
        store.set_user(second.clone());
        // No merge: the first user's bio is gone.
        assert_eq!(store.user(), Some(second));
    }

    #[test]
    fn test_round_trip_through_storage() {
        let storage = Arc::new(MemorySessionStorage::new());
        {
            let store = SessionStore::open(storage.clone());
            store.set_token("tok-123");
            store.set_user(sample_user());
        }

        // Fresh store over the same backing, as after a restart.
        let rehydrated = SessionStore::open(storage);
        assert!(rehydrated.is_authenticated());
        assert_eq!(rehydrated.token().as_deref(), Some("tok-123"));
        assert_eq!(rehydrated.user(), Some(sample_user()));
    }

    #[test]
    fn test_logout_persists_cleared_state() {
        let storage = Arc::new(MemorySessionStorage::new());
        {
            let store = SessionStore::open(storage.clone());
            store.set_token("tok-123");
            store.logout();
        }

        let rehydrated = SessionStore::open(storage);
        assert!(!rehydrated.is_authenticated());
        assert!(rehydrated.token().is_none());
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let store = SessionStore::open(Arc::new(FailingStorage));
        store.set_token("abc");
        store.set_user(sample_user());
        // The failed write is swallowed; in-memory state is authoritative.
        assert!(store.is_authenticated());
        assert_eq!(store.user(), Some(sample_user()));
    }

    #[test]
    fn test_subscribers_observe_mutations() {
        let store = memory_store();
        let mut rx = store.subscribe();
        assert!(!rx.borrow().is_authenticated());

        store.set_token("abc");
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        store.logout();
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
