//! Stored credentials: the bearer token and the cached user profile.
//!
//! # Design
//! The client never reads ambient global state. It is handed an
//! `Arc<dyn Session>` at construction; `MemorySession` serves tests and
//! short-lived tools, `FileSession` persists across runs.
//!
//! The token is read once, when a request is built. A `clear()` racing with
//! an in-flight request does not affect that request; the server decides
//! whether the token it carried is still valid.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

/// Profile of the signed-in user, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Key-value store for the token and user, shared by every request.
pub trait Session: Send + Sync {
    fn token(&self) -> Option<String>;
    fn user(&self) -> Option<User>;
    fn store(&self, token: &str, user: &User) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Stored {
    token: Option<String>,
    user: Option<User>,
}

/// In-process session. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySession {
    inner: RwLock<Stored>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            inner: RwLock::new(Stored {
                token: Some(token.to_string()),
                user: None,
            }),
        }
    }
}

impl Session for MemorySession {
    fn token(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    fn user(&self) -> Option<User> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    fn store(&self, token: &str, user: &User) -> Result<(), SessionError> {
        let mut stored = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        stored.token = Some(token.to_string());
        stored.user = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut stored = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *stored = Stored::default();
        Ok(())
    }
}

/// Session persisted as a small JSON file.
///
/// The file is loaded once on open and rewritten on every `store`.
/// `clear` deletes it. The file holds a bearer token, so it is only ever
/// readable by its owner.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    cache: RwLock<Stored>,
}

impl FileSession {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let stored = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| SessionError::Corrupt(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Stored::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "opened session file");
        Ok(Self {
            path,
            cache: RwLock::new(stored),
        })
    }

    /// Open the session at `<config dir>/campus/session.json`.
    pub fn open_default() -> Result<Self, SessionError> {
        Self::open(default_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename it over the target, so a
    /// crash mid-write leaves the previous session intact. `NamedTempFile`
    /// is created with mode 0600 on unix and the rename keeps that mode.
    fn persist(&self, stored: &Stored) -> Result<(), SessionError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let raw = serde_json::to_vec_pretty(stored).map_err(|e| SessionError::Corrupt(e.to_string()))?;
        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        file.write_all(&raw)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Session for FileSession {
    fn token(&self) -> Option<String> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    fn user(&self) -> Option<User> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    fn store(&self, token: &str, user: &User) -> Result<(), SessionError> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let next = Stored {
            token: Some(token.to_string()),
            user: Some(user.clone()),
        };
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *cache = Stored::default();
        Ok(())
    }
}

fn default_path() -> Result<PathBuf, SessionError> {
    let base = dirs::config_dir().ok_or_else(|| {
        SessionError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no config directory for this platform",
        ))
    })?;
    Ok(base.join("campus").join("session.json"))
}
