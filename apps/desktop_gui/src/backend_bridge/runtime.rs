//! Runtime bridge between UI command queue and backend event intake.

use std::{
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::{
    config::{normalize_server_url, Settings},
    run_request, ProcessClient, ProcessRequest, ProcessingService, RunOutcome, RunUpdate,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

const NO_SERVER: &str = "no usable server url; update it in Settings";

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: Settings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
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

        runtime.block_on(run_worker(cmd_rx, ui_tx, settings));
        tracing::info!("backend worker stopped");
    })
}

/// Commands arriving while no client could be built fail fast. A later
/// `SetServerUrl` with a usable address brings the worker back.
async fn run_worker(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    let connect_timeout = settings.connect_timeout();
    let mut service: Option<Arc<dyn ProcessingService>> =
        match ProcessClient::with_connect_timeout(&settings.server_url, connect_timeout) {
            Ok(client) => {
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "Backend worker ready ({})",
                    settings.server_url
                )));
                Some(Arc::new(client))
            }
            Err(err) => {
                tracing::error!(server_url = %settings.server_url, "failed to build client: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::Settings,
                    format!("{}; {NO_SERVER}", err.message),
                )));
                None
            }
        };

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::StartRun(request) => match &service {
                Some(service) => {
                    tokio::spawn(execute_run(Arc::clone(service), request, ui_tx.clone()));
                }
                None => {
                    let _ = ui_tx.send(UiEvent::RunFinished {
                        run_id: request.run_id,
                        outcome: RunOutcome::TransportFailure(NO_SERVER.to_string()),
                    });
                }
            },
            BackendCommand::Download {
                download_url,
                dest_dir,
            } => match &service {
                Some(service) => {
                    tokio::spawn(execute_download(
                        Arc::clone(service),
                        download_url,
                        dest_dir,
                        ui_tx.clone(),
                    ));
                }
                None => {
                    let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::Settings,
                        NO_SERVER,
                    )));
                }
            },
            BackendCommand::SetServerUrl { server_url } => {
                let server_url = normalize_server_url(&server_url);
                match ProcessClient::with_connect_timeout(&server_url, connect_timeout) {
                    Ok(client) => {
                        service = Some(Arc::new(client));
                        tracing::info!(%server_url, "server url updated");
                        let _ = ui_tx.try_send(UiEvent::Info(format!("Server: {server_url}")));
                    }
                    Err(err) => {
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                            UiErrorContext::Settings,
                            err.message,
                        )));
                    }
                }
            }
        }
    }
}

/// Runs one request to completion, forwarding progress to the UI. Status
/// lines may be dropped under back-pressure; the finish event never is.
pub async fn execute_run(
    service: Arc<dyn ProcessingService>,
    request: ProcessRequest,
    ui_tx: Sender<UiEvent>,
) {
    run_request(service.as_ref(), request, move |update| match update {
        RunUpdate::Status { run_id, message } => {
            if let Err(TrySendError::Full(_)) =
                ui_tx.try_send(UiEvent::RunStatus { run_id, message })
            {
                tracing::warn!(run_id = run_id.0, "ui event queue full; status dropped");
            }
        }
        RunUpdate::Finished { run_id, outcome } => {
            if ui_tx.send(UiEvent::RunFinished { run_id, outcome }).is_err() {
                tracing::warn!(run_id = run_id.0, "ui closed before run finished");
            }
        }
    })
    .await;
}

pub async fn execute_download(
    service: Arc<dyn ProcessingService>,
    download_url: String,
    dest_dir: PathBuf,
    ui_tx: Sender<UiEvent>,
) {
    let event = match service.download(&download_url, &dest_dir).await {
        Ok(path) => UiEvent::Downloaded(path),
        Err(err) => {
            tracing::warn!(%download_url, "download failed: {err:#}");
            UiEvent::Error(UiError::from_message(
                UiErrorContext::Download,
                format!("{err:#}"),
            ))
        }
    };
    let _ = ui_tx.send(event);
}
