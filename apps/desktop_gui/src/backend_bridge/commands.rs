//! Backend commands queued from UI to backend worker.

use client_core::SubmitRequest;
use shared::domain::BookId;

#[derive(Debug)]
pub enum BackendCommand {
    LoadCatalog,
    LoadManagerList,
    LoadBook { id: BookId },
    SubmitBook { request: SubmitRequest },
    DeleteBook { id: BookId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadCatalog => "load_catalog",
            BackendCommand::LoadManagerList => "load_manager_list",
            BackendCommand::LoadBook { .. } => "load_book",
            BackendCommand::SubmitBook { .. } => "submit_book",
            BackendCommand::DeleteBook { .. } => "delete_book",
        }
    }
}
