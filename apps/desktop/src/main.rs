use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, normalize_server_url},
    controller::OptionPanel,
    run_request, ProcessClient, RunUpdate, UploadController,
};
use shared::{
    domain::{Layout, PaperFormat, Selection, VectorFormat},
    i18n::{text, Locale, MessageKey},
};
use tracing_subscriber::EnvFilter;

/// Upload a Python plotting script for restyling and stream its progress.
#[derive(Parser, Debug)]
#[command(name = "academicplot", version)]
struct Args {
    /// Python plotting script to process.
    #[arg(required_unless_present = "list_formats")]
    file: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    locale: Option<Locale>,
    #[arg(long)]
    beautify: bool,
    #[arg(long)]
    academic: bool,
    #[arg(long, default_value_t = PaperFormat::Nature)]
    paper_format: PaperFormat,
    #[arg(long, default_value_t = Layout::Single)]
    layout: Layout,
    #[arg(long)]
    vector_format: Option<VectorFormat>,
    #[arg(long, default_value_t = 300)]
    dpi: u32,
    /// Send the custom parameter group (requires --academic).
    #[arg(long)]
    custom: bool,
    #[arg(long)]
    font_size: Option<u32>,
    #[arg(long)]
    title_size: Option<u32>,
    #[arg(long)]
    fig_width: Option<f32>,
    #[arg(long)]
    fig_height: Option<f32>,
    #[arg(long)]
    custom_dpi: Option<u32>,
    /// Save the processed result locally once the run succeeds.
    #[arg(long)]
    download: bool,
    #[arg(long)]
    download_dir: Option<PathBuf>,
    /// Print the server's paper format table and exit.
    #[arg(long)]
    list_formats: bool,
}

impl Args {
    fn apply_options(&self, panel: &mut OptionPanel) {
        panel.set_beautify(self.beautify);
        panel.set_academic_mode(self.academic);
        panel.paper_format = self.paper_format;
        panel.layout = self.layout;
        panel.vector_format = self.vector_format;
        panel.dpi = self.dpi;

        if self.custom && !self.academic {
            tracing::warn!("--custom has no effect without --academic");
        }
        panel.set_custom_mode(self.custom && self.academic);
        if let Some(v) = self.font_size {
            panel.custom.font_size = v;
        }
        if let Some(v) = self.title_size {
            panel.custom.title_size = v;
        }
        if let Some(v) = self.fig_width {
            panel.custom.fig_width = v;
        }
        if let Some(v) = self.fig_height {
            panel.custom.fig_height = v;
        }
        if let Some(v) = self.custom_dpi {
            panel.custom.custom_dpi = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = &args.server_url {
        settings.server_url = normalize_server_url(server_url);
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }
    if let Some(dir) = &args.download_dir {
        settings.download_dir = dir.clone();
    }

    let client = ProcessClient::with_connect_timeout(&settings.server_url, settings.connect_timeout())?;

    if args.list_formats {
        let formats = client
            .paper_formats()
            .await
            .context("failed to fetch paper formats")?;
        for (key, info) in formats {
            println!(
                "{key:<8} {:<10} single {:?} in, double {:?} in, {} DPI",
                info.name, info.single_column, info.double_column, info.dpi
            );
        }
        return Ok(());
    }

    let locale = settings.locale;
    let mut controller = UploadController::new(locale);
    args.apply_options(controller.options_mut());

    let path = args
        .file
        .clone()
        .ok_or_else(|| anyhow!("no input file given"))?;
    let selection = Selection::from_path(&path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    if let Err(err) = controller.select_file(Some(selection)) {
        bail!("{} ({})", text(locale, MessageKey::UnsupportedFileType), err.message);
    }
    if let Some(selection) = controller.selection() {
        println!(
            "{} ({})",
            selection.name,
            controller.formatted_size().unwrap_or_default()
        );
    }

    let request = controller
        .start_processing()
        .ok_or_else(|| anyhow!("processing could not be started"))?;
    println!("{}", controller.status_text());

    run_request(&client, request, |update| match update {
        RunUpdate::Status { run_id, message } => {
            if controller.apply_status(run_id, message) {
                println!("  {}", controller.status_text());
            }
        }
        RunUpdate::Finished { run_id, outcome } => {
            if let Some(err) = outcome.error() {
                tracing::warn!(run_id = run_id.0, code = ?err.code, "run failed: {}", err.message);
            }
            controller.finish_run(run_id, outcome);
        }
    })
    .await;

    println!("{}", controller.status_text());

    let Some(result) = controller.result().cloned() else {
        let reason = controller
            .notifications()
            .latest()
            .map(|toast| toast.render(locale))
            .unwrap_or_else(|| controller.status_text());
        bail!(reason);
    };

    let link = client.resolve(&result.download_url)?;
    println!("{}: {link}", text(locale, MessageKey::DownloadResult));

    if args.download {
        let saved = client
            .download(&result.download_url, &settings.download_dir)
            .await
            .context("failed to download result")?;
        println!("{}", saved.display());
    }

    Ok(())
}
