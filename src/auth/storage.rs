//! Durable storage backends for the session.
//!
//! The store itself never touches the filesystem; it talks to a
//! `SessionStorage` implementation. Production uses `FileSessionStorage`
//! (a JSON file in the cache directory); tests and locked-down
//! environments use `MemorySessionStorage`.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::warn;

use super::session::Session;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Where the session survives between runs.
///
/// `load` is lenient: a missing entry is an empty session, and an
/// unreadable or corrupt entry degrades to the same thing rather than
/// failing startup.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

pub struct FileSessionStorage {
    cache_dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Option<Session> {
        let path = self.session_path();
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse session file");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session file {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory backend. Holds the session for the process lifetime only.
#[derive(Default)]
pub struct MemorySessionStorage {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Option<Session> {
        self.inner.lock().ok()?.clone()
    }

    fn save(&self, session: &Session) -> Result<()> {
        match self.inner.lock() {
            Ok(mut guard) => {
                *guard = Some(session.clone());
                Ok(())
            }
            Err(_) => Err(anyhow::anyhow!("session storage mutex poisoned")),
        }
    }

    fn clear(&self) -> Result<()> {
        match self.inner.lock() {
            Ok(mut guard) => {
                *guard = None;
                Ok(())
            }
            Err(_) => Err(anyhow::anyhow!("session storage mutex poisoned")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn sample_user() -> User {
        User {
            id: 1,
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

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().to_path_buf());

        let session = Session {
            token: Some("tok-123".to_string()),
            user: Some(sample_user()),
        };
        storage.save(&session).unwrap();

        let loaded = storage.load().expect("session should load back");
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().to_path_buf());
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_file_storage_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        let storage = FileSessionStorage::new(dir.path().to_path_buf());
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_file_storage_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().to_path_buf());

        let session = Session {
            token: Some("tok-123".to_string()),
            user: None,
        };
        storage.save(&session).unwrap();
        storage.clear().unwrap();

        assert!(!dir.path().join(SESSION_FILE).exists());
        assert!(storage.load().is_none());
        // Clearing again is a no-op, not an error.
        storage.clear().unwrap();
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemorySessionStorage::new();
        assert!(storage.load().is_none());

        let session = Session {
            token: Some("tok-123".to_string()),
            user: None,
        };
        storage.save(&session).unwrap();
        assert_eq!(storage.load(), Some(session));

        storage.clear().unwrap();
        assert!(storage.load().is_none());
    }
}
