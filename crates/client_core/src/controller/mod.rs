//! Upload controller: selection, processing gate, run lifecycle and the
//! page-level UI state (status line, result link, toasts, guide, locale).
//!
//! Every method is a synchronous state transition. Work that leaves the UI
//! thread is returned as a [`ProcessRequest`] for the caller to execute, and
//! its results come back through [`UploadController::apply_status`] and
//! [`UploadController::finish_run`].

pub mod accordion;
pub mod notifications;
pub mod options;

use shared::{
    domain::{format_file_size, is_supported_upload, ProcessingState, RunId, Selection},
    error::ClientError,
    i18n::{Locale, MessageKey},
    protocol::ProcessOptions,
};
use tracing::{debug, info};

use crate::stream::RunOutcome;

pub use accordion::{Accordion, Section};
pub use notifications::{LocalText, Notification, NotificationKind, Notifications};
pub use options::OptionPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSeverity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: LocalText,
    pub severity: StatusSeverity,
}

impl StatusLine {
    fn key(key: MessageKey, severity: StatusSeverity) -> Self {
        Self {
            text: LocalText::Key(key),
            severity,
        }
    }

    fn initial() -> Self {
        Self::key(MessageKey::WaitingForUpload, StatusSeverity::Success)
    }

    pub fn render(&self, locale: Locale) -> String {
        self.text.render(locale)
    }
}

/// Result link shown after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub download_url: String,
    pub message: Option<String>,
}

/// Everything a run needs, captured when it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub run_id: RunId,
    pub selection: Selection,
    pub options: ProcessOptions,
}

#[derive(Debug)]
pub struct UploadController {
    selection: Option<Selection>,
    state: ProcessingState,
    active_run: Option<RunId>,
    last_run: RunId,
    options: OptionPanel,
    accordion: Accordion,
    status: StatusLine,
    result: Option<ResultView>,
    notifications: Notifications,
    locale: Locale,
    guide_visible: bool,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl UploadController {
    pub fn new(locale: Locale) -> Self {
        Self {
            selection: None,
            state: ProcessingState::Idle,
            active_run: None,
            last_run: RunId(0),
            options: OptionPanel::default(),
            accordion: Accordion::default(),
            status: StatusLine::initial(),
            result: None,
            notifications: Notifications::default(),
            locale,
            guide_visible: false,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn formatted_size(&self) -> Option<String> {
        self.selection
            .as_ref()
            .map(|selection| format_file_size(selection.size_bytes))
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state == ProcessingState::Processing
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active_run
    }

    pub fn can_start_processing(&self) -> bool {
        self.selection.is_some() && self.state == ProcessingState::Idle
    }

    pub fn options(&self) -> &OptionPanel {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionPanel {
        &mut self.options
    }

    pub fn accordion(&self) -> &Accordion {
        &self.accordion
    }

    pub fn accordion_mut(&mut self) -> &mut Accordion {
        &mut self.accordion
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn status_text(&self) -> String {
        self.status.render(self.locale)
    }

    pub fn result(&self) -> Option<&ResultView> {
        self.result.as_ref()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn guide_visible(&self) -> bool {
        self.guide_visible
    }

    pub fn show_guide(&mut self) {
        self.guide_visible = true;
    }

    pub fn hide_guide(&mut self) {
        self.guide_visible = false;
    }

    /// Replaces the selection with `candidate`. `None` (a cancelled dialog)
    /// and any call while a run is in flight leave everything untouched and
    /// return `Ok(false)`.
    pub fn select_file(&mut self, candidate: Option<Selection>) -> Result<bool, ClientError> {
        let Some(candidate) = candidate else {
            return Ok(false);
        };
        if self.is_processing() {
            debug!(file = %candidate.name, "ignoring file selection while processing");
            return Ok(false);
        }
        if !is_supported_upload(&candidate.name) {
            self.notify_error(None, LocalText::Key(MessageKey::UnsupportedFileType));
            return Err(ClientError::unsupported_file_type(&candidate.name));
        }

        info!(file = %candidate.name, size_bytes = candidate.size_bytes, "file selected");
        self.selection = Some(candidate);
        self.status = StatusLine::key(MessageKey::FileSelected, StatusSeverity::Success);
        self.result = None;
        Ok(true)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.status = StatusLine::initial();
        self.result = None;
    }

    /// Back to the initial page state. An in-flight run is abandoned: its
    /// late updates are ignored.
    pub fn reset_all(&mut self) {
        self.clear_selection();
        self.state = ProcessingState::Idle;
        self.active_run = None;
        self.options.reset();
    }

    pub fn start_processing(&mut self) -> Option<ProcessRequest> {
        if !self.can_start_processing() {
            debug!(state = ?self.state, "start_processing ignored");
            return None;
        }
        let selection = self.selection.clone()?;

        self.last_run = self.last_run.next();
        let run_id = self.last_run;
        self.active_run = Some(run_id);
        self.state = ProcessingState::Processing;
        self.status = StatusLine::key(MessageKey::Processing, StatusSeverity::Warning);
        self.result = None;

        Some(ProcessRequest {
            run_id,
            selection,
            options: self.options.snapshot(),
        })
    }

    /// Non-terminal progress text from the server. Returns whether it applied.
    pub fn apply_status(&mut self, run_id: RunId, message: impl Into<String>) -> bool {
        if self.active_run != Some(run_id) {
            return false;
        }
        self.status = StatusLine {
            text: LocalText::Raw(message.into()),
            severity: StatusSeverity::Warning,
        };
        true
    }

    /// The single terminal transition of a run. Finishes for any run other
    /// than the active one are ignored.
    pub fn finish_run(&mut self, run_id: RunId, outcome: RunOutcome) -> bool {
        if self.active_run != Some(run_id) {
            debug!(run_id = run_id.0, "ignoring finish for inactive run");
            return false;
        }
        self.active_run = None;
        self.state = ProcessingState::Idle;

        match outcome {
            RunOutcome::Succeeded {
                download_url,
                message,
            } => {
                self.result = Some(ResultView {
                    download_url,
                    message,
                });
                self.status =
                    StatusLine::key(MessageKey::ProcessingComplete, StatusSeverity::Success);
            }
            RunOutcome::ServerError(message) => self.fail_run(
                Some(MessageKey::ProcessingErrorPrefix),
                LocalText::Raw(message),
            ),
            RunOutcome::TransportFailure(message) => self.fail_run(
                Some(MessageKey::RequestFailedPrefix),
                LocalText::Raw(message),
            ),
            RunOutcome::StreamEnded => {
                self.fail_run(None, LocalText::Key(MessageKey::StreamEndedEarly))
            }
        }
        true
    }

    /// Surfaces a failure that is not tied to a run, such as a failed
    /// download of the result.
    pub fn report_error(&mut self, prefix: Option<MessageKey>, message: impl Into<String>) {
        self.notify_error(prefix, LocalText::Raw(message.into()));
    }

    fn fail_run(&mut self, prefix: Option<MessageKey>, body: LocalText) {
        self.notify_error(prefix, body);
        self.status = StatusLine::key(MessageKey::ProcessingFailed, StatusSeverity::Error);
    }

    fn notify_error(&mut self, prefix: Option<MessageKey>, body: LocalText) {
        self.notifications
            .push(NotificationKind::Error, prefix, body);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
