use serde::{Deserialize, Serialize};

use crate::{domain::Book, error::PayloadError};

/// Body of `POST /books` and `PUT /books/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i32,
    pub price: f64,
}

impl BookPayload {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            year: book.year,
            price: book.price,
        }
    }

    /// Rejects payloads the backend could never accept, e.g. a NaN price.
    pub fn ensure_well_formed(&self) -> Result<(), PayloadError> {
        if !self.price.is_finite() {
            return Err(PayloadError(format!("price {} is not finite", self.price)));
        }
        if self.title.trim().is_empty() || self.author.trim().is_empty() {
            return Err(PayloadError("title and author are required".to_string()));
        }
        Ok(())
    }
}

/// Body of a successful `DELETE /books/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}
