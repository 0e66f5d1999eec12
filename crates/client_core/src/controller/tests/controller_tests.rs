use super::*;

use shared::error::ErrorCode;

fn script(name: &str, size_bytes: u64) -> Selection {
    Selection::new(name, size_bytes, format!("/tmp/{name}"))
}

fn selected_controller() -> UploadController {
    let mut controller = UploadController::new(Locale::En);
    controller
        .select_file(Some(script("plot.py", 1536)))
        .expect("select");
    controller
}

#[test]
fn starts_idle_with_the_waiting_status() {
    let controller = UploadController::new(Locale::En);
    assert_eq!(controller.state(), ProcessingState::Idle);
    assert!(!controller.can_start_processing());
    assert_eq!(controller.status_text(), "Waiting for a file");
    assert_eq!(controller.accordion().open_section(), Some(Section::Upload));
}

#[test]
fn cancelled_dialog_is_a_silent_no_op() {
    let mut controller = selected_controller();
    assert_eq!(controller.select_file(None), Ok(false));
    assert_eq!(controller.selection().map(|s| s.name.as_str()), Some("plot.py"));
    assert!(controller.notifications().is_empty());
}

#[test]
fn selecting_a_script_exposes_size_and_enables_processing() {
    let controller = selected_controller();
    assert_eq!(controller.formatted_size().as_deref(), Some("1.5 KB"));
    assert!(controller.can_start_processing());
    assert_eq!(controller.status_text(), "File selected, ready to process");
}

#[test]
fn wrong_extension_is_rejected_and_keeps_the_previous_selection() {
    let mut controller = selected_controller();
    let err = controller
        .select_file(Some(script("data.csv", 10)))
        .expect_err("must reject");

    assert_eq!(err.code, ErrorCode::UnsupportedFileType);
    assert_eq!(controller.selection().map(|s| s.name.as_str()), Some("plot.py"));
    let toast = controller.notifications().latest().expect("toast");
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.render(Locale::En), "Please choose a Python file (.py)");
}

#[test]
fn clearing_the_selection_disables_processing_and_hides_results() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");
    controller.finish_run(
        request.run_id,
        RunOutcome::Succeeded {
            download_url: "/download/plot.png".into(),
            message: None,
        },
    );
    assert!(controller.result().is_some());

    controller.clear_selection();
    assert!(controller.selection().is_none());
    assert!(controller.result().is_none());
    assert!(!controller.can_start_processing());
    assert_eq!(controller.status_text(), "Waiting for a file");
}

#[test]
fn start_processing_snapshots_selection_and_options() {
    let mut controller = selected_controller();
    controller.options_mut().set_beautify(true);
    controller.options_mut().set_academic_mode(true);

    let request = controller.start_processing().expect("request");
    assert_eq!(request.run_id, RunId(1));
    assert_eq!(request.selection.name, "plot.py");
    assert!(request.options.beautify);
    assert!(request.options.academic.is_some());
    assert_eq!(controller.state(), ProcessingState::Processing);
    assert_eq!(controller.status_text(), "Processing file...");
}

#[test]
fn second_start_while_processing_is_a_no_op() {
    let mut controller = selected_controller();
    let mut issued = Vec::new();
    issued.extend(controller.start_processing());
    issued.extend(controller.start_processing());
    issued.extend(controller.start_processing());

    assert_eq!(issued.len(), 1);
    assert!(!controller.can_start_processing());
}

#[test]
fn selection_is_locked_while_processing() {
    let mut controller = selected_controller();
    controller.start_processing().expect("request");
    assert_eq!(controller.select_file(Some(script("other.py", 1))), Ok(false));
    assert_eq!(controller.selection().map(|s| s.name.as_str()), Some("plot.py"));
}

#[test]
fn status_then_success_walks_processing_to_idle_with_a_link() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");

    assert!(controller.apply_status(request.run_id, "A"));
    assert_eq!(controller.state(), ProcessingState::Processing);
    assert_eq!(controller.status_text(), "A");

    assert!(controller.finish_run(
        request.run_id,
        RunOutcome::Succeeded {
            download_url: "/x".into(),
            message: Some("done".into()),
        },
    ));
    assert_eq!(controller.state(), ProcessingState::Idle);
    assert_eq!(controller.result().map(|r| r.download_url.as_str()), Some("/x"));
    assert_eq!(controller.status_text(), "Processing complete!");
    assert!(controller.notifications().is_empty());
    assert!(controller.can_start_processing());
}

#[test]
fn server_error_returns_to_idle_with_a_toast_and_no_result() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");

    controller.finish_run(request.run_id, RunOutcome::ServerError("boom".into()));

    assert_eq!(controller.state(), ProcessingState::Idle);
    assert!(controller.result().is_none());
    let toast = controller.notifications().latest().expect("toast");
    assert_eq!(toast.body, LocalText::Raw("boom".into()));
    assert_eq!(toast.render(Locale::En), "Processing error: boom");
    assert_eq!(controller.status().severity, StatusSeverity::Error);
    assert_eq!(controller.status_text(), "Processing failed");
}

#[test]
fn stream_end_without_result_still_returns_to_idle() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");

    controller.finish_run(request.run_id, RunOutcome::StreamEnded);

    assert_eq!(controller.state(), ProcessingState::Idle);
    assert_eq!(controller.status().severity, StatusSeverity::Error);
    assert_eq!(controller.notifications().len(), 1);
}

#[test]
fn transport_failure_is_reported_like_an_error_event() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");

    controller.finish_run(
        request.run_id,
        RunOutcome::TransportFailure("connection refused".into()),
    );

    assert_eq!(controller.state(), ProcessingState::Idle);
    let toast = controller.notifications().latest().expect("toast");
    assert_eq!(toast.render(Locale::En), "Request failed: connection refused");
}

#[test]
fn a_run_finishes_exactly_once() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");

    assert!(controller.finish_run(request.run_id, RunOutcome::ServerError("first".into())));
    assert!(!controller.finish_run(
        request.run_id,
        RunOutcome::Succeeded {
            download_url: "/late".into(),
            message: None,
        },
    ));
    assert!(!controller.apply_status(request.run_id, "late status"));

    assert!(controller.result().is_none());
    assert_eq!(controller.notifications().len(), 1);
}

#[test]
fn updates_from_an_abandoned_run_are_ignored() {
    let mut controller = selected_controller();
    let stale = controller.start_processing().expect("request");

    controller.reset_all();
    assert_eq!(controller.state(), ProcessingState::Idle);

    controller
        .select_file(Some(script("plot.py", 10)))
        .expect("select");
    let fresh = controller.start_processing().expect("request");
    assert_ne!(stale.run_id, fresh.run_id);

    assert!(!controller.finish_run(stale.run_id, RunOutcome::StreamEnded));
    assert_eq!(controller.state(), ProcessingState::Processing);
}

#[test]
fn reset_all_restores_the_initial_page_and_is_idempotent() {
    let mut controller = selected_controller();
    controller.options_mut().set_beautify(true);
    controller.options_mut().set_academic_mode(true);
    controller.options_mut().set_custom_mode(true);
    controller.start_processing().expect("request");

    controller.reset_all();
    controller.reset_all();

    assert!(controller.selection().is_none());
    assert_eq!(controller.state(), ProcessingState::Idle);
    assert_eq!(controller.options(), &OptionPanel::default());
    assert_eq!(controller.status_text(), "Waiting for a file");
    assert!(controller.result().is_none());
}

#[test]
fn switching_locale_rerenders_status_without_changing_state() {
    let mut controller = selected_controller();
    let request = controller.start_processing().expect("request");
    controller.finish_run(request.run_id, RunOutcome::StreamEnded);
    let state = controller.state();

    controller.set_locale(Locale::Zh);
    assert_eq!(controller.status_text(), "处理失败");
    assert_eq!(controller.state(), state);

    controller.set_locale(Locale::En);
    assert_eq!(controller.status_text(), "Processing failed");
}

#[test]
fn guide_modal_opens_and_closes() {
    let mut controller = UploadController::default();
    assert!(!controller.guide_visible());
    controller.show_guide();
    assert!(controller.guide_visible());
    controller.hide_guide();
    assert!(!controller.guide_visible());
}
