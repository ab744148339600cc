//! In-memory `CatalogApi` double shared by the view tests.

use async_trait::async_trait;
use shared::{
    domain::{Book, BookId},
    protocol::BookPayload,
};
use tokio::sync::Mutex;

use crate::{CatalogApi, CatalogError, CatalogResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ApiCall {
    List,
    Get(BookId),
    Create(BookPayload),
    Update(BookId, BookPayload),
    Delete(BookId),
    Categories,
}

#[derive(Default)]
pub(crate) struct FakeCatalogApi {
    pub(crate) books: Mutex<Vec<Book>>,
    pub(crate) calls: Mutex<Vec<ApiCall>>,
    pub(crate) fail_reads: Option<CatalogError>,
    pub(crate) fail_writes: Option<CatalogError>,
    pub(crate) fail_deletes: Option<CatalogError>,
}

impl FakeCatalogApi {
    pub(crate) fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
            ..Self::default()
        }
    }

    pub(crate) async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn stored(&self) -> Vec<Book> {
        self.books.lock().await.clone()
    }

    async fn record(&self, call: ApiCall) {
        self.calls.lock().await.push(call);
    }
}

fn book_from_payload(id: BookId, payload: &BookPayload) -> Book {
    Book::new(
        id,
        payload.title.clone(),
        payload.author.clone(),
        payload.isbn.clone(),
        payload.year,
        payload.price,
    )
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn list_books(&self) -> CatalogResult<Vec<Book>> {
        self.record(ApiCall::List).await;
        if let Some(err) = &self.fail_reads {
            return Err(err.clone());
        }
        Ok(self.books.lock().await.clone())
    }

    async fn get_book(&self, id: BookId) -> CatalogResult<Book> {
        self.record(ApiCall::Get(id)).await;
        if let Some(err) = &self.fail_reads {
            return Err(err.clone());
        }
        self.books
            .lock()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(CatalogError::Status {
                status: 404,
                reason: "Not Found".to_string(),
            })
    }

    async fn create_book(&self, payload: &BookPayload) -> CatalogResult<Book> {
        self.record(ApiCall::Create(payload.clone())).await;
        if let Some(err) = &self.fail_writes {
            return Err(err.clone());
        }
        let mut books = self.books.lock().await;
        let next = books.iter().map(|book| book.id.0).max().unwrap_or(0) + 1;
        let created = book_from_payload(BookId(next), payload);
        books.push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, id: BookId, payload: &BookPayload) -> CatalogResult<Book> {
        self.record(ApiCall::Update(id, payload.clone())).await;
        if let Some(err) = &self.fail_writes {
            return Err(err.clone());
        }
        let mut books = self.books.lock().await;
        let Some(slot) = books.iter_mut().find(|book| book.id == id) else {
            return Err(CatalogError::Rejected {
                status: 404,
                message: "book not found".to_string(),
            });
        };
        *slot = book_from_payload(id, payload);
        Ok(slot.clone())
    }

    async fn delete_book(&self, id: BookId) -> CatalogResult<()> {
        self.record(ApiCall::Delete(id)).await;
        if let Some(err) = &self.fail_deletes {
            return Err(err.clone());
        }
        self.books.lock().await.retain(|book| book.id != id);
        Ok(())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<String>> {
        self.record(ApiCall::Categories).await;
        let mut categories: Vec<String> = self
            .books
            .lock()
            .await
            .iter()
            .filter_map(|book| book.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

const SAMPLE_CATEGORIES: [&str; 3] = ["fiction", "science", "History"];

/// `count` books with ids `1..=count`, distinct prices, cycling categories,
/// and reviews missing on every fourth book.
pub(crate) fn sample_books(count: i64) -> Vec<Book> {
    (1..=count)
        .map(|n| {
            let mut book = Book::new(
                BookId(n),
                format!("Title {n}"),
                format!("Author {}", n % 5),
                format!("978-{n:04}"),
                1990 + (n % 30) as i32,
                10.0 + ((n * 37) % 101) as f64 + n as f64 / 1000.0,
            )
            .with_category(SAMPLE_CATEGORIES[(n as usize) % SAMPLE_CATEGORIES.len()]);
            if n % 4 != 0 {
                book = book.with_reviews(((n * 13) % 50) as u32);
            }
            book
        })
        .collect()
}

pub(crate) fn network_down() -> CatalogError {
    CatalogError::Transport("connection refused".to_string())
}
