//! Authentication module: session state, the route guard, and credentials.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for the login session,
//!   persisted through a pluggable `SessionStorage` backend
//! - `RouteGuard`: the two-phase gate that keeps protected views from
//!   flashing before rehydration settles
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! Sessions are persisted on every mutation and rehydrated once at startup.

pub mod credentials;
pub mod guard;
pub mod session;
pub mod storage;

pub use credentials::CredentialStore;
pub use guard::{GuardDecision, RouteGuard};
pub use session::{Session, SessionStore};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
