//! Applies backend events to the page state.

use std::path::PathBuf;

use client_core::{
    controller::{LocalText, NotificationKind},
    UploadController,
};

use crate::controller::events::{UiEvent, UiErrorContext};

/// Worker-level state shown in the footer, outside the upload controller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub message: Option<String>,
    pub last_download: Option<PathBuf>,
    pub failed: bool,
}

pub fn apply_ui_event(controller: &mut UploadController, backend: &mut BackendStatus, event: UiEvent) {
    match event {
        UiEvent::Info(message) => {
            backend.message = Some(message);
        }
        UiEvent::RunStatus { run_id, message } => {
            controller.apply_status(run_id, message);
        }
        UiEvent::RunFinished { run_id, outcome } => {
            if !controller.finish_run(run_id, outcome) {
                tracing::debug!(run_id = run_id.0, "dropped finish for a run no longer shown");
            }
        }
        UiEvent::Downloaded(path) => {
            controller.notifications_mut().push(
                NotificationKind::Info,
                None,
                LocalText::Raw(path.display().to_string()),
            );
            backend.last_download = Some(path);
        }
        UiEvent::Error(err) => {
            if err.context() == UiErrorContext::BackendStartup {
                backend.failed = true;
                backend.message = Some(err.message().to_string());
            }
            controller.report_error(None, err.display_message());
        }
    }
}

#[cfg(test)]
mod tests {
    use client_core::RunOutcome;
    use shared::{
        domain::{ProcessingState, Selection},
        i18n::Locale,
    };

    use super::*;
    use crate::controller::events::UiError;

    fn started() -> (UploadController, shared::domain::RunId) {
        let mut controller = UploadController::new(Locale::En);
        controller
            .select_file(Some(Selection::new("plot.py", 12, "/tmp/plot.py")))
            .expect("select");
        let request = controller.start_processing().expect("request");
        (controller, request.run_id)
    }

    #[test]
    fn run_events_drive_the_controller_to_a_result() {
        let (mut controller, run_id) = started();
        let mut backend = BackendStatus::default();

        apply_ui_event(
            &mut controller,
            &mut backend,
            UiEvent::RunStatus {
                run_id,
                message: "Restyling axes".into(),
            },
        );
        assert_eq!(controller.status_text(), "Restyling axes");

        apply_ui_event(
            &mut controller,
            &mut backend,
            UiEvent::RunFinished {
                run_id,
                outcome: RunOutcome::Succeeded {
                    download_url: "/download/plot.png".into(),
                    message: None,
                },
            },
        );
        assert_eq!(controller.state(), ProcessingState::Idle);
        assert!(controller.result().is_some());
    }

    #[test]
    fn download_completion_records_the_path_and_notifies() {
        let mut controller = UploadController::new(Locale::En);
        let mut backend = BackendStatus::default();

        apply_ui_event(
            &mut controller,
            &mut backend,
            UiEvent::Downloaded(PathBuf::from("/tmp/plot.png")),
        );

        assert_eq!(backend.last_download, Some(PathBuf::from("/tmp/plot.png")));
        let toast = controller.notifications().latest().expect("toast");
        assert_eq!(toast.kind, NotificationKind::Info);
    }

    #[test]
    fn startup_errors_mark_the_backend_failed() {
        let mut controller = UploadController::new(Locale::En);
        let mut backend = BackendStatus::default();

        apply_ui_event(
            &mut controller,
            &mut backend,
            UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                "failed to build runtime",
            )),
        );

        assert!(backend.failed);
        assert_eq!(controller.notifications().len(), 1);
        assert_eq!(controller.state(), ProcessingState::Idle);
    }
}
