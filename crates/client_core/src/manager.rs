//! Back-office book table: load, confirm-then-delete, and the notices shown
//! after a delete.

use shared::domain::{Book, BookId};
use tracing::{info, warn};

use crate::{
    navigation::Route, session::ManagerSession, CatalogApi, CatalogError, CatalogResult,
    SessionError,
};

/// New sequence without the book `id`; order of the rest is kept.
pub fn remove_by_id(books: &[Book], id: BookId) -> Vec<Book> {
    books.iter().filter(|book| book.id != id).cloned().collect()
}

/// Transient message shown after a manager action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Pending delete awaiting the user's yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: BookId,
    title: Option<String>,
}

impl DeleteConfirmation {
    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn prompt(&self) -> String {
        match &self.title {
            Some(title) => format!(
                "Delete book ID {} (\"{title}\")? This action cannot be undone.",
                self.id
            ),
            None => format!("Delete book ID {}? This action cannot be undone.", self.id),
        }
    }
}

#[derive(Debug)]
pub struct ManagerList {
    manager: String,
    books: Vec<Book>,
    loading: bool,
    error: Option<CatalogError>,
    notice: Option<Notice>,
    deleting: Option<BookId>,
}

impl ManagerList {
    pub fn new(session: &ManagerSession) -> Result<Self, SessionError> {
        let manager = session.require_manager()?.to_string();
        Ok(Self {
            manager,
            books: Vec::new(),
            loading: false,
            error: None,
            notice: None,
            deleting: None,
        })
    }

    pub async fn load(&mut self, api: &dyn CatalogApi) {
        self.begin_load();
        let result = api.list_books().await;
        self.apply_load(result);
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn apply_load(&mut self, result: CatalogResult<Vec<Book>>) {
        self.loading = false;
        match result {
            Ok(books) => {
                info!(manager = %self.manager, count = books.len(), "manager list loaded");
                self.books = books;
                self.error = None;
            }
            Err(err) => {
                warn!("manager list load failed: {err}");
                self.error = Some(err);
            }
        }
    }

    pub fn request_delete(&self, id: BookId) -> DeleteConfirmation {
        let title = self
            .books
            .iter()
            .find(|book| book.id == id)
            .map(|book| book.title.clone());
        DeleteConfirmation { id, title }
    }

    /// Marks the delete as in flight. `None` while another delete is pending.
    pub fn begin_delete(&mut self, confirmation: DeleteConfirmation) -> Option<BookId> {
        if self.deleting.is_some() {
            return None;
        }
        self.deleting = Some(confirmation.id);
        Some(confirmation.id)
    }

    pub fn apply_delete(&mut self, id: BookId, result: CatalogResult<()>) {
        if self.deleting == Some(id) {
            self.deleting = None;
        }
        match result {
            Ok(()) => {
                info!(manager = %self.manager, book_id = id.0, "book deleted");
                self.books = remove_by_id(&self.books, id);
                self.notice = Some(Notice::Success("Book deleted successfully".to_string()));
            }
            Err(err) => {
                warn!(book_id = id.0, "book delete failed: {err}");
                self.notice = Some(Notice::Error(format!("Failed to delete book: {err}")));
            }
        }
    }

    /// Sends the confirmed delete. Returns false if one was already in flight.
    pub async fn confirm_delete(
        &mut self,
        confirmation: DeleteConfirmation,
        api: &dyn CatalogApi,
    ) -> bool {
        let Some(id) = self.begin_delete(confirmation) else {
            return false;
        };
        let result = api.delete_book(id).await;
        self.apply_delete(id, result);
        true
    }

    pub fn edit_route(&self, id: BookId) -> Route {
        Route::EditBook(id)
    }

    pub fn add_route(&self) -> Route {
        Route::AddBook
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn count(&self) -> usize {
        self.books.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_deleting(&self, id: BookId) -> bool {
        self.deleting == Some(id)
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[cfg(test)]
#[path = "tests/manager_tests.rs"]
mod tests;
