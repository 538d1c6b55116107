//! Bearer token storage and session events

use crate::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;
use tracing::debug;

/// Session state broadcast to whoever owns navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Active,
    /// The backend answered 401/403; the token has been cleared
    LoggedOut,
}

/// Bearer token held in memory and optionally mirrored to a file
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// In-memory store
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed store, loading an existing token if the file is present
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let token = match fs::read_to_string(&path) {
            Ok(content) => Some(content.trim().to_string()).filter(|t| !t.is_empty()),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            token: RwLock::new(token),
            path: Some(path),
        })
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if let Some(path) = &self.path {
            fs::write(path, &token)?;
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    /// Forget the token in memory and on disk
    pub fn clear(&self) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "token file removed"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

/// Sender side of the session channel
pub(crate) fn session_channel() -> (watch::Sender<SessionEvent>, watch::Receiver<SessionEvent>) {
    watch::channel(SessionEvent::Active)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_token_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("idlerealm-{name}-{}.token", std::process::id()))
    }

    #[test]
    fn test_in_memory() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get(), None);
        store.set("abc").unwrap();
        assert_eq!(store.get().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_backed() {
        let path = temp_token_path("store");
        let _ = fs::remove_file(&path);

        let store = TokenStore::open(&path).unwrap();
        assert_eq!(store.get(), None);
        store.set("secret").unwrap();

        let reopened = TokenStore::open(&path).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("secret"));

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(TokenStore::open(&path).unwrap().get(), None);
    }
}
