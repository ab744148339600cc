//! Store-manager session: an explicit value handed to protected views, and
//! the file that remembers it between runs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::SessionError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSession {
    authenticated: bool,
    #[serde(default)]
    username: Option<String>,
}

impl ManagerSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(username: &str) -> Result<Self, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::EmptyUsername);
        }
        Ok(Self {
            authenticated: true,
            username: Some(username.to_string()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Gate for manager views; yields the manager's name.
    pub fn require_manager(&self) -> Result<&str, SessionError> {
        if !self.authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        Ok(self.username.as_deref().unwrap_or("manager"))
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means nobody is signed in.
    pub fn load(&self) -> Result<ManagerSession, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ManagerSession::anonymous())
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&raw).map_err(|source| SessionError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, session: &ManagerSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let raw = serde_json::to_string_pretty(session).map_err(|source| SessionError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, raw).map_err(|source| self.io_error(source))?;
        info!(path = %self.path.display(), "manager session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "manager session cleared");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
