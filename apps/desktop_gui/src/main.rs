use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod config;
mod controller;
mod media;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::app::{PersistedViewerPrefs, PortfolioApp, SETTINGS_STORAGE_KEY};

#[derive(Debug, Parser)]
#[command(name = "folio", about = "Desktop viewer for a personal project portfolio")]
struct Cli {
    /// Portfolio manifest path; overrides config and environment.
    #[arg(long)]
    portfolio: Option<std::path::PathBuf>,
    /// Viewer config file (defaults to ./folio.toml).
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Tracing filter, e.g. "info" or "carousel_core=debug".
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_env_filter(cli.log_filter).init();

    let settings = config::load_settings(cli.config.as_deref(), cli.portfolio.as_deref());

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Folio")
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([720.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Folio Portfolio Viewer",
        options,
        Box::new(move |cc| {
            backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx, cc.egui_ctx.clone());
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedViewerPrefs>(&text).ok())
            });
            Ok(Box::new(PortfolioApp::new(cmd_tx, ui_rx, settings, persisted)))
        }),
    )
}
