//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{CatalogError, CatalogResult, SubmitTicket};
use shared::domain::{Book, BookId};

pub enum UiEvent {
    CatalogLoaded(CatalogResult<Vec<Book>>),
    ManagerListLoaded(CatalogResult<Vec<Book>>),
    BookLoaded {
        id: BookId,
        result: CatalogResult<Book>,
    },
    SubmitFinished {
        ticket: SubmitTicket,
        result: CatalogResult<Book>,
    },
    DeleteFinished {
        id: BookId,
        result: CatalogResult<()>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Network,
    Server,
    Validation,
    Auth,
    Unknown,
}

/// Which user action failed; decides where the message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Fetch,
    Submit,
    Delete,
    Session,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_catalog(context: UiErrorContext, err: &CatalogError) -> Self {
        let category = match err {
            CatalogError::Transport(_) => UiErrorCategory::Network,
            CatalogError::Status { status, .. } | CatalogError::Rejected { status, .. }
                if *status == 401 || *status == 403 =>
            {
                UiErrorCategory::Auth
            }
            CatalogError::Rejected { status, .. } if *status == 400 || *status == 422 => {
                UiErrorCategory::Validation
            }
            CatalogError::Status { .. } | CatalogError::Rejected { .. } => UiErrorCategory::Server,
            CatalogError::InvalidRequest(_) => UiErrorCategory::Validation,
            CatalogError::Decode(_) => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("sign-in") || lower.contains("unauthorized") {
            UiErrorCategory::Auth
        } else if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("timed out")
        {
            UiErrorCategory::Network
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn requires_sign_in(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    /// Line shown in the status bar.
    pub fn headline(&self) -> String {
        let action = match self.context {
            UiErrorContext::BackendStartup => "Startup failed",
            UiErrorContext::Fetch => "Could not load books",
            UiErrorContext::Submit => "Could not save book",
            UiErrorContext::Delete => "Could not delete book",
            UiErrorContext::Session => "Session problem",
        };
        if self.category == UiErrorCategory::Network {
            format!("{action} (server unreachable): {}", self.message)
        } else {
            format!("{action}: {}", self.message)
        }
    }
}
