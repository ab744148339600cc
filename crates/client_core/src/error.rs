//! Failure modes of the catalog client and the views built on it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(String),
    /// Non-2xx on a read or delete; carries the status line.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },
    /// Non-2xx on create/update; carries the backend's message when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Why the form refused to start a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("a submission is already in progress")]
    InProgress,
    #[error("form is not editable in its current state")]
    NotReady,
    #[error("{0} field(s) failed validation")]
    Invalid(usize),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("store manager sign-in required")]
    NotAuthenticated,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
