//! Gate between the session and protected views.
//!
//! The guard starts in `Checking` until the first frame has been drawn,
//! so rehydration can never race the first decision. After that it is
//! `Decided` for the rest of the process, and every decision re-reads
//! the live session. Protected content is only ever built on `Render`;
//! `Redirect` draws nothing of it, not even for one frame.

use tokio::sync::watch;

use super::session::Session;

/// Hydration phase. One-directional: `Checking` -> `Decided`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardState {
    Checking,
    Decided,
}

/// What the hosting view should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Still checking: draw a neutral placeholder only.
    Placeholder,
    /// Not authenticated: go to the login view, draw no protected content.
    Redirect,
    /// Authenticated: draw the protected content.
    Render,
}

pub struct RouteGuard {
    state: GuardState,
    session: watch::Receiver<Session>,
}

impl RouteGuard {
    /// A new guard is always `Checking`, whatever the session holds.
    pub fn new(session: watch::Receiver<Session>) -> Self {
        Self {
            state: GuardState::Checking,
            session,
        }
    }

    /// Mark rehydration complete. Called once the first frame is on
    /// screen; calling it again is a no-op.
    pub fn finish_hydration(&mut self) {
        self.state = GuardState::Decided;
    }

    pub fn is_checking(&self) -> bool {
        self.state == GuardState::Checking
    }

    /// Decide for the current frame. In `Decided` this reads the session
    /// fresh every time, so a logout flips the very next decision.
    pub fn decision(&self) -> GuardDecision {
        match self.state {
            GuardState::Checking => GuardDecision::Placeholder,
            GuardState::Decided => {
                if self.session.borrow().is_authenticated() {
                    GuardDecision::Render
                } else {
                    GuardDecision::Redirect
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::SessionStore;
    use crate::auth::storage::MemorySessionStorage;
    use std::sync::Arc;

    fn store() -> SessionStore {
        SessionStore::open(Arc::new(MemorySessionStorage::new()))
    }

    #[test]
    fn test_checking_never_renders_even_when_authenticated() {
        let store = store();
        store.set_token("abc");

        let guard = RouteGuard::new(store.subscribe());
        // Authenticated or not, the checking phase only yields a placeholder.
        assert_eq!(guard.decision(), GuardDecision::Placeholder);
    }

    #[test]
    fn test_decided_redirects_when_unauthenticated() {
        let store = store();
        let mut guard = RouteGuard::new(store.subscribe());
        guard.finish_hydration();
        assert_eq!(guard.decision(), GuardDecision::Redirect);
    }

    #[test]
    fn test_decided_renders_when_authenticated() {
        let store = store();
        store.set_token("abc");
        let mut guard = RouteGuard::new(store.subscribe());
        guard.finish_hydration();
        assert_eq!(guard.decision(), GuardDecision::Render);
    }

    #[test]
    fn test_logout_flips_next_decision() {
        let store = store();
        store.set_token("abc");
        let mut guard = RouteGuard::new(store.subscribe());
        guard.finish_hydration();
        assert_eq!(guard.decision(), GuardDecision::Render);

        store.logout();
        assert_eq!(guard.decision(), GuardDecision::Redirect);
    }

    #[test]
    fn test_login_after_redirect_renders() {
        let store = store();
        let mut guard = RouteGuard::new(store.subscribe());
        guard.finish_hydration();
        assert_eq!(guard.decision(), GuardDecision::Redirect);

        store.set_token("abc");
        assert_eq!(guard.decision(), GuardDecision::Render);
    }

    #[test]
    fn test_finish_hydration_is_idempotent_and_one_way() {
        let store = store();
        let mut guard = RouteGuard::new(store.subscribe());
        guard.finish_hydration();
        guard.finish_hydration();
        assert!(!guard.is_checking());
        assert_eq!(guard.decision(), GuardDecision::Redirect);
    }

    #[test]
    fn test_rehydrated_session_renders_after_first_frame() {
        // Simulates a restart with a persisted token: the first frame is
        // still a placeholder, then the guard decides from the rehydrated
        // session.
        let storage = Arc::new(MemorySessionStorage::new());
        {
            let prior = SessionStore::open(storage.clone());
            prior.set_token("persisted");
        }
        let store = SessionStore::open(storage);
        let mut guard = RouteGuard::new(store.subscribe());
        assert_eq!(guard.decision(), GuardDecision::Placeholder);
        guard.finish_hydration();
        assert_eq!(guard.decision(), GuardDecision::Render);
    }
}
