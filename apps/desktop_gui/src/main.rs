use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use clap::Parser;
use client_core::config::{load_settings, normalize_server_url, Settings};
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::i18n::{text, Locale, MessageKey};
use tracing_subscriber::EnvFilter;
use ui::app::AcademicPlotApp;

const SETTINGS_STORAGE_KEY: &str = "academicplot_gui.settings";

#[derive(Parser, Debug)]
#[command(name = "academicplot_gui", version)]
struct Args {
    /// Overrides the configured and remembered server URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    locale: Option<Locale>,
}

/// What the window remembers between launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PersistedGuiSettings {
    locale: Locale,
    server_url: String,
    download_dir: PathBuf,
}

impl Default for PersistedGuiSettings {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            locale: settings.locale,
            server_url: settings.server_url,
            download_dir: default_download_dir(),
        }
    }
}

impl PersistedGuiSettings {
    fn apply_to(&self, settings: &mut Settings) {
        settings.locale = self.locale;
        settings.server_url = normalize_server_url(&self.server_url);
        settings.download_dir = self.download_dir.clone();
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| Settings::default().download_dir)
}

/// Remembered window state wins over the settings file, explicit flags win
/// over both.
fn resolve_settings(
    base: Settings,
    persisted: Option<&PersistedGuiSettings>,
    args: &Args,
) -> Settings {
    let mut settings = base;
    if let Some(persisted) = persisted {
        persisted.apply_to(&mut settings);
    }
    if let Some(server_url) = &args.server_url {
        settings.server_url = normalize_server_url(server_url);
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }
    settings
}

fn read_persisted(storage: Option<&dyn eframe::Storage>) -> Option<PersistedGuiSettings> {
    storage.and_then(|storage| {
        storage
            .get_string(SETTINGS_STORAGE_KEY)
            .and_then(|text| serde_json::from_str::<PersistedGuiSettings>(&text).ok())
    })
}

/// `RUST_LOG` directives when they parse, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> eframe::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);

    let base = load_settings();
    let title = text(base.locale, MessageKey::AppTitle);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([860.0, 760.0])
            .with_min_inner_size([560.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            ui::fonts::install_cjk_fallback(&cc.egui_ctx);
            let persisted = read_persisted(cc.storage);
            let settings = resolve_settings(base, persisted.as_ref(), &args);
            tracing::info!(
                server_url = %settings.server_url,
                locale = %settings.locale,
                "starting academicplot gui"
            );
            backend_bridge::runtime::launch(cmd_rx, ui_tx, settings.clone());
            Ok(Box::new(AcademicPlotApp::new(cmd_tx, ui_rx, &settings)))
        }),
    )
}
