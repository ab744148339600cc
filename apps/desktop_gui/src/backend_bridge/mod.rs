//! Worker thread that performs catalog I/O on behalf of the UI thread.

pub mod commands;
pub mod runtime;
