use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::claims::Role;
use super::jwt::decode_role;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What survives between runs: the bearer token and the role decoded from it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionState, SessionError>;
    fn persist(&self, state: &SessionState) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON file on disk, the CLI's stand-in for browser local storage.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionState::default())
            }
            Err(e) => return Err(self.io_err(e)),
        };
        serde_json::from_str(&raw).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let body = serde_json::to_vec_pretty(state).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, body).map_err(|e| self.io_err(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<SessionState>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        Ok(self.inner.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(|p| p.into_inner()) = state.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(|p| p.into_inner()) = SessionState::default();
        Ok(())
    }
}

/// Process-wide session handle. Cheap to clone; every clone sees the same
/// token. Read at the start of each request, written only on sign in/out.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("state", &self.snapshot()).finish()
    }
}

impl Session {
    pub fn open(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let state = store.load()?;
        debug!(signed_in = state.token.is_some(), "session loaded");
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            store,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            store: Arc::new(MemorySessionStore::default()),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().token.filter(|t| !t.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Role for display. Decoded from the token when possible; a token that
    /// cannot be decoded falls back to the role stored at sign-in.
    pub fn role(&self) -> Option<Role> {
        let SessionState { token, role } = self.snapshot();
        let token = token?;
        match decode_role(&token) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, "cannot decode session token; using stored role");
                role
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Stores a freshly issued token together with the role decoded from it.
    pub fn sign_in(&self, token: String) -> Result<Option<Role>, SessionError> {
        let role = decode_role(&token).unwrap_or_else(|e| {
            warn!(error = %e, "issued token has an unreadable payload");
            None
        });
        let next = SessionState {
            token: Some(token),
            role,
        };
        self.store.persist(&next)?;
        *self.state.write().unwrap_or_else(|p| p.into_inner()) = next;
        debug!(role = ?role, "signed in");
        Ok(role)
    }

    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        *self.state.write().unwrap_or_else(|p| p.into_inner()) = SessionState::default();
        debug!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::token_for;

    #[test]
    fn sign_in_decodes_role_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = Arc::new(FileSessionStore::new(&path));

        let session = Session::open(store.clone()).unwrap();
        assert!(!session.is_authenticated());

        let role = session.sign_in(token_for("admin")).unwrap();
        assert_eq!(role, Some(Role::Admin));
        assert!(session.is_admin());

        // a new process sees the same session
        let reopened = Session::open(Arc::new(FileSessionStore::new(&path))).unwrap();
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.role(), Some(Role::Admin));
    }

    #[test]
    fn sign_out_clears_token_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = Session::open(Arc::new(FileSessionStore::new(&path))).unwrap();
        session.sign_in(token_for("user")).unwrap();
        assert!(path.exists());

        session.sign_out().unwrap();
        assert!(session.token().is_none());
        assert!(session.role().is_none());
        assert!(!path.exists());
        // clearing twice is fine
        session.sign_out().unwrap();
    }

    #[test]
    fn undecodable_token_falls_back_to_stored_role() {
        let store = Arc::new(MemorySessionStore::default());
        store
            .persist(&SessionState {
                token: Some("opaque-token".into()),
                role: Some(Role::Admin),
            })
            .unwrap();
        let session = Session::open(store).unwrap();
        assert_eq!(session.role(), Some(Role::Admin));
    }

    #[test]
    fn clones_share_state() {
        let session = Session::in_memory();
        let other = session.clone();
        session.sign_in(token_for("user")).unwrap();
        assert_eq!(other.role(), Some(Role::User));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Session::open(Arc::new(FileSessionStore::new(&path))).unwrap_err();
        assert!(matches!(err, SessionError::Corrupt { .. }));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let session = Session::in_memory();
        session.sign_in(token_for("user")).unwrap();
        let printed = format!("{session:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains(&session.token().unwrap()));
    }
}
