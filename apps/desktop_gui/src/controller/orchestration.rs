//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{RunOutcome, UploadController};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

const QUEUE_FULL: &str = "UI command queue is full; please retry";
const WORKER_GONE: &str = "backend worker disconnected; restart the application";

/// Queues `cmd` for the backend worker. A run that cannot be queued is
/// finished immediately as a transport failure so the page never stays stuck
/// in the processing state.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    controller: &mut UploadController,
) {
    let cmd_name = cmd.name();
    tracing::debug!(command = cmd_name, "queueing ui->backend command");

    let (reason, rejected) = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return;
        }
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            (QUEUE_FULL, cmd)
        }
        Err(TrySendError::Disconnected(cmd)) => {
            tracing::error!(command = cmd_name, "backend worker disconnected");
            (WORKER_GONE, cmd)
        }
    };

    match rejected {
        BackendCommand::StartRun(request) => {
            controller.finish_run(request.run_id, RunOutcome::TransportFailure(reason.into()));
        }
        _ => controller.report_error(None, reason),
    }
}
