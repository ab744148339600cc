//! Client core for the bookstore: the books API client plus the view state
//! engines (catalog browsing, manager list, add/edit form) that the CLI and
//! the desktop GUI drive.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Book, BookId},
    error::ApiErrorBody,
    protocol::BookPayload,
};
use tracing::{debug, warn};
use url::Url;

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod manager;
pub mod navigation;
pub mod session;
pub mod validation;

pub use catalog::{CatalogView, CategoryFilter, SortKey, PAGE_SIZE};
pub use config::{load_settings, ClientSettings};
pub use error::{CatalogError, SessionError, SubmitRejected};
pub use form::{
    BookFormController, FormMode, FormPhase, FormState, SubmitRequest, SubmitTicket,
};
pub use manager::{remove_by_id, DeleteConfirmation, ManagerList, Notice};
pub use navigation::{DeferredNavigation, Route};
pub use session::{ManagerSession, SessionStore};
pub use validation::{validate, FieldErrors, FormField};

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Remote books collection. Views depend on this trait only, so tests and the
/// GUI bridge can substitute their own implementation.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_books(&self) -> CatalogResult<Vec<Book>>;
    async fn get_book(&self, id: BookId) -> CatalogResult<Book>;
    async fn create_book(&self, payload: &BookPayload) -> CatalogResult<Book>;
    async fn update_book(&self, id: BookId, payload: &BookPayload) -> CatalogResult<Book>;
    async fn delete_book(&self, id: BookId) -> CatalogResult<()>;
    async fn list_categories(&self) -> CatalogResult<Vec<String>>;
}

/// `CatalogApi` over plain HTTP/JSON.
#[derive(Clone)]
pub struct HttpCatalogClient {
    http: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// `base_url` is the collection endpoint, e.g. `http://localhost:8080/api/v1/books`.
    pub fn new(base_url: &str) -> CatalogResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> CatalogResult<Self> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| CatalogError::InvalidRequest(format!("bad base url {base_url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidRequest(format!(
                "unsupported scheme {} in {base_url}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: BookId) -> String {
        format!("{}/{}", self.base_url, id.0)
    }

    async fn read_json<T: DeserializeOwned>(res: Response) -> CatalogResult<T> {
        res.json::<T>()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))
    }

    fn status_error(status: StatusCode) -> CatalogError {
        CatalogError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("request failed").to_string(),
        }
    }

    /// Builds the submit error: body message if present, else the status text.
    async fn rejection(res: Response) -> CatalogError {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.best_message().map(str::to_string))
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Failed to process book".to_string());
        CatalogError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    async fn send_payload(
        &self,
        method: reqwest::Method,
        url: String,
        payload: &BookPayload,
    ) -> CatalogResult<Book> {
        payload
            .ensure_well_formed()
            .map_err(|err| CatalogError::InvalidRequest(err.to_string()))?;
        debug!(%method, %url, "submitting book");
        let res = self
            .http
            .request(method.clone(), &url)
            .json(payload)
            .send()
            .await
            .inspect_err(|err| warn!(%method, %url, "book submit transport failure: {err}"))?;
        if !res.status().is_success() {
            let err = Self::rejection(res).await;
            warn!(%method, %url, "book submit rejected: {err}");
            return Err(err);
        }
        Self::read_json(res).await
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_books(&self) -> CatalogResult<Vec<Book>> {
        debug!(url = %self.base_url, "listing books");
        let res = self.http.get(&self.base_url).send().await?;
        if !res.status().is_success() {
            let err = Self::status_error(res.status());
            warn!("failed to fetch books: {err}");
            return Err(err);
        }
        Self::read_json(res).await
    }

    async fn get_book(&self, id: BookId) -> CatalogResult<Book> {
        let url = self.item_url(id);
        debug!(%url, "fetching book");
        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            let err = Self::status_error(res.status());
            warn!(book_id = id.0, "failed to fetch book: {err}");
            return Err(err);
        }
        Self::read_json(res).await
    }

    async fn create_book(&self, payload: &BookPayload) -> CatalogResult<Book> {
        self.send_payload(reqwest::Method::POST, self.base_url.clone(), payload)
            .await
    }

    async fn update_book(&self, id: BookId, payload: &BookPayload) -> CatalogResult<Book> {
        self.send_payload(reqwest::Method::PUT, self.item_url(id), payload)
            .await
    }

    async fn delete_book(&self, id: BookId) -> CatalogResult<()> {
        let url = self.item_url(id);
        debug!(%url, "deleting book");
        let res = self.http.delete(&url).send().await?;
        if !res.status().is_success() {
            let err = Self::status_error(res.status());
            warn!(book_id = id.0, "failed to delete book: {err}");
            return Err(err);
        }
        Ok(())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<String>> {
        let url = format!("{}/categories", self.base_url);
        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(Self::status_error(res.status()));
        }
        Self::read_json(res).await
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
