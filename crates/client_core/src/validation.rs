//! Field rules for the add/edit book form.

use std::collections::BTreeMap;

use chrono::Datelike;
use shared::{domain::Book, protocol::BookPayload};

pub const MIN_TEXT_LEN: usize = 2;
pub const MIN_YEAR: i32 = 1000;
pub const MAX_PRICE: f64 = 999_999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Author,
    Isbn,
    Year,
    Price,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Author,
        FormField::Isbn,
        FormField::Year,
        FormField::Price,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Isbn => "isbn",
            Self::Year => "year",
            Self::Price => "price",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Isbn => "ISBN",
            Self::Year => "Publication year",
            Self::Price => "Price",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Field name to message; empty when the form is submittable.
pub type FieldErrors = BTreeMap<FormField, String>;

/// Raw text of the editable book fields, kept verbatim while the user types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: String,
    pub price: String,
}

impl FormValues {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            year: book.year.to_string(),
            price: book.price.to_string(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Isbn => &self.isbn,
            FormField::Year => &self.year,
            FormField::Price => &self.price,
        }
    }

    pub fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
            FormField::Isbn => &mut self.isbn,
            FormField::Year => &mut self.year,
            FormField::Price => &mut self.price,
        }
    }

    /// Trimmed text fields and parsed numbers. `None` if a number does not parse.
    pub fn to_payload(&self) -> Option<BookPayload> {
        Some(BookPayload {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            year: parse_year(&self.year)?,
            price: parse_price(&self.price)?,
        })
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|price| price.is_finite())
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Validates against today's calendar year.
pub fn validate_now(values: &FormValues) -> FieldErrors {
    validate(values, current_year())
}

pub fn validate(values: &FormValues, current_year: i32) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(message) = check_text(&values.title, "Please enter the book title", "Title") {
        errors.insert(FormField::Title, message);
    }
    if let Some(message) = check_text(&values.author, "Please enter the author", "Author") {
        errors.insert(FormField::Author, message);
    }

    let isbn = values.isbn.trim();
    if isbn.is_empty() {
        errors.insert(FormField::Isbn, "Please enter the ISBN".to_string());
    } else if !isbn.chars().all(|c| c.is_ascii_digit() || c == '-') {
        errors.insert(
            FormField::Isbn,
            "ISBN may contain only digits and hyphens".to_string(),
        );
    }

    let max_year = current_year + 1;
    if values.year.trim().is_empty() {
        errors.insert(FormField::Year, "Please enter the publication year".to_string());
    } else {
        match parse_year(&values.year) {
            None => {
                errors.insert(FormField::Year, "Year must be a whole number".to_string());
            }
            Some(year) if !(MIN_YEAR..=max_year).contains(&year) => {
                errors.insert(
                    FormField::Year,
                    format!("Year must be between {MIN_YEAR} and {max_year}"),
                );
            }
            Some(_) => {}
        }
    }

    if values.price.trim().is_empty() {
        errors.insert(FormField::Price, "Please enter the price".to_string());
    } else {
        match parse_price(&values.price) {
            None => {
                errors.insert(FormField::Price, "Price must be a number".to_string());
            }
            Some(price) if price <= 0.0 => {
                errors.insert(FormField::Price, "Price must be greater than 0".to_string());
            }
            Some(price) if price > MAX_PRICE => {
                errors.insert(FormField::Price, "Price must not exceed 999,999".to_string());
            }
            Some(_) => {}
        }
    }

    errors
}

fn check_text(raw: &str, missing: &str, label: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Some(missing.to_string())
    } else if trimmed.chars().count() < MIN_TEXT_LEN {
        Some(format!("{label} must be at least {MIN_TEXT_LEN} characters"))
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
