use std::sync::Arc;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::{load_settings, HttpCatalogClient, SessionStore};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{BookstoreApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "bookstore-gui", about = "BookStore storefront and back office")]
struct Args {
    /// Catalog API base URL; overrides the settings file and environment.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    let api = HttpCatalogClient::new(&settings.api_base_url)
        .with_context(|| format!("invalid catalog API url {}", settings.api_base_url))?;
    tracing::info!(api = %api.base_url(), "starting desktop gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    let startup = StartupConfig {
        redirect_delay: settings.redirect_delay(),
        sessions: SessionStore::new(settings.session_file.clone()),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("BookStore")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "BookStore",
        options,
        Box::new(move |cc| {
            let repaint_ctx = cc.egui_ctx.clone();
            backend_bridge::runtime::launch(Arc::new(api), cmd_rx, ui_tx, move || {
                repaint_ctx.request_repaint()
            });
            Ok(Box::new(BookstoreApp::new(cmd_tx, ui_rx, startup)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop gui exited with error: {err}"))
}
