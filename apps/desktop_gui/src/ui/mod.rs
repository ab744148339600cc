//! UI layer for desktop GUI: app shell and its screens.

pub mod app;

pub use app::{BookstoreApp, StartupConfig};
