//! Routes between views and the delayed redirect that follows a successful save.

use std::{fmt, time::Duration, time::Instant};

use shared::domain::BookId;

pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Catalog,
    BookDetail(BookId),
    ManagerList,
    AddBook,
    EditBook(BookId),
    Login,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Catalog => write!(f, "/books"),
            Route::BookDetail(id) => write!(f, "/books/{id}"),
            Route::ManagerList => write!(f, "/store-manager/all-books"),
            Route::AddBook => write!(f, "/store-manager/add-book"),
            Route::EditBook(id) => write!(f, "/store-manager/edit-book/{id}"),
            Route::Login => write!(f, "/login"),
        }
    }
}

/// A navigation request that fires once `due_at` has passed, unless cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredNavigation {
    target: Route,
    due_at: Instant,
    cancelled: bool,
}

impl DeferredNavigation {
    pub fn schedule(target: Route, now: Instant, delay: Duration) -> Self {
        Self {
            target,
            due_at: now + delay,
            cancelled: false,
        }
    }

    pub fn target(&self) -> Route {
        self.target
    }

    pub fn due_at(&self) -> Instant {
        self.due_at
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.due_at.saturating_duration_since(now)
    }

    /// The target route once due; `None` before then or after cancellation.
    pub fn poll(&self, now: Instant) -> Option<Route> {
        (!self.cancelled && now >= self.due_at).then_some(self.target)
    }
}
