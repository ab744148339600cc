//! Catalog browsing: the fetched book list plus the derived visible view
//! (category filter, search, sort) and its pagination.
//!
//! The visible list is held as indices into the fetched list, so deriving a
//! view never touches the books themselves.

use std::cmp::Ordering;

use shared::domain::{Book, ALL_CATEGORIES, CATEGORIES};
use tracing::{info, warn};

use crate::{CatalogApi, CatalogError, CatalogResult};

pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    Popular,
    #[default]
    Newest,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Newest,
        SortKey::PriceLow,
        SortKey::PriceHigh,
        SortKey::Popular,
    ];

    /// Unknown keys fall back to `newest`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "popular" => Self::Popular,
            _ => Self::Newest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Popular => "popular",
            Self::Newest => "newest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PriceLow => "Price: low to high",
            Self::PriceHigh => "Price: high to low",
            Self::Popular => "Most popular",
            Self::Newest => "Newest",
        }
    }

    fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            Self::PriceLow => a.price.total_cmp(&b.price),
            Self::PriceHigh => b.price.total_cmp(&a.price),
            Self::Popular => b.popularity().cmp(&a.popularity()),
            Self::Newest => b.id.cmp(&a.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::All
        } else {
            Self::Named(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }

    fn admits(&self, book: &Book) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => book.in_category(name),
        }
    }
}

#[derive(Debug)]
pub struct CatalogView {
    books: Vec<Book>,
    visible: Vec<usize>,
    category: CategoryFilter,
    search: String,
    sort: Option<SortKey>,
    current_page: usize,
    loading: bool,
    error: Option<CatalogError>,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            visible: Vec::new(),
            category: CategoryFilter::All,
            search: String::new(),
            sort: None,
            current_page: 1,
            loading: false,
            error: None,
        }
    }

    /// Fetches the whole catalog. Failures are kept for display, never retried.
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
        self.category = CategoryFilter::All;
        self.search.clear();
        self.sort = None;
        self.current_page = 1;
        match result {
            Ok(books) => {
                info!(count = books.len(), "catalog loaded");
                self.visible = (0..books.len()).collect();
                self.books = books;
                self.error = None;
            }
            Err(err) => {
                warn!("catalog load failed: {err}");
                self.books.clear();
                self.visible.clear();
                self.error = Some(err);
            }
        }
    }

    /// Narrows to books whose title or author contains `term`, ignoring case.
    /// Composes with an active category filter.
    pub fn search(&mut self, term: &str) {
        self.search = term.to_string();
        self.recompute();
        self.current_page = 1;
    }

    /// `all` resets the view to the full catalog: category, search term and
    /// sort are all cleared.
    pub fn filter_by_category(&mut self, category: &str) {
        self.category = CategoryFilter::parse(category);
        if self.category == CategoryFilter::All {
            self.search.clear();
            self.sort = None;
        }
        self.recompute();
        self.current_page = 1;
    }

    /// Reorders the current visible list. Equal keys keep their relative order.
    /// A later search or filter re-sorts from the fetched order by this key
    /// alone, so ties fall back to fetch order rather than earlier sorts.
    pub fn sort(&mut self, key: SortKey) {
        self.sort = Some(key);
        self.apply_sort();
    }

    fn recompute(&mut self) {
        let category = &self.category;
        let term = self.search.as_str();
        self.visible = self
            .books
            .iter()
            .enumerate()
            .filter(|(_, book)| category.admits(book) && book.matches_term(term))
            .map(|(index, _)| index)
            .collect();
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let Some(key) = self.sort else {
            return;
        };
        let books = &self.books;
        self.visible
            .sort_by(|&a, &b| key.compare(&books[a], &books[b]));
    }

    /// Books on 1-indexed page `n`; out-of-range pages are empty.
    pub fn page(&self, n: usize) -> Vec<&Book> {
        if n == 0 {
            return Vec::new();
        }
        let start = (n - 1).saturating_mul(PAGE_SIZE);
        if start >= self.visible.len() {
            return Vec::new();
        }
        let end = (start + PAGE_SIZE).min(self.visible.len());
        self.visible[start..end]
            .iter()
            .map(|&index| &self.books[index])
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current_slice(&self) -> Vec<&Book> {
        self.page(self.current_page)
    }

    /// Moves to page `n`, clamped to the pages that exist.
    pub fn go_to_page(&mut self, n: usize) {
        self.current_page = n.clamp(1, self.total_pages().max(1));
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn next_page(&mut self) {
        if self.has_next_page() {
            self.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.has_previous_page() {
            self.current_page -= 1;
        }
    }

    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages()
    }

    pub fn visible_books(&self) -> Vec<&Book> {
        self.visible.iter().map(|&index| &self.books[index]).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn categories(&self) -> &'static [&'static str] {
        CATEGORIES
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn active_sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
