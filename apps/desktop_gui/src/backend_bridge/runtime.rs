//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::CatalogApi;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    api: Arc<dyn CatalogApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    repaint: impl Fn() + Send + Sync + 'static,
) {
    let repaint = Arc::new(repaint);
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        while let Ok(cmd) = cmd_rx.recv() {
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            let repaint = Arc::clone(&repaint);
            runtime.spawn(async move {
                let event = execute(api.as_ref(), cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui event receiver dropped");
                }
                repaint();
            });
        }
        tracing::info!("backend command queue closed; worker exiting");
    });
}

pub async fn execute(api: &dyn CatalogApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::LoadCatalog => UiEvent::CatalogLoaded(api.list_books().await),
        BackendCommand::LoadManagerList => UiEvent::ManagerListLoaded(api.list_books().await),
        BackendCommand::LoadBook { id } => UiEvent::BookLoaded {
            id,
            result: api.get_book(id).await,
        },
        BackendCommand::SubmitBook { request } => UiEvent::SubmitFinished {
            ticket: request.ticket,
            result: request.send(api).await,
        },
        BackendCommand::DeleteBook { id } => UiEvent::DeleteFinished {
            id,
            result: api.delete_book(id).await,
        },
    }
}
