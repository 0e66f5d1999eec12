//! Backend-to-UI events and error modeling for the desktop GUI.

use std::path::PathBuf;

use client_core::RunOutcome;
use shared::domain::RunId;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    RunStatus { run_id: RunId, message: String },
    RunFinished { run_id: RunId, outcome: RunOutcome },
    Downloaded(PathBuf),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Filesystem,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Download,
    Settings,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("relative url")
            || message_lower.contains("unsafe")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("permission denied")
            || message_lower.contains("no such file")
            || message_lower.contains("failed to create")
            || message_lower.contains("failed to write")
            || message_lower.contains("read-only")
        {
            UiErrorCategory::Filesystem
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("connect")
            || message_lower.contains("network")
            || message_lower.contains("dns")
            || message_lower.contains("disconnect")
            || message_lower.contains("responded with")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Short hint appended to the toast so the user knows where to look.
    pub fn hint(&self) -> Option<&'static str> {
        match (self.context, self.category) {
            (UiErrorContext::BackendStartup, _) => Some("restart the application"),
            (_, UiErrorCategory::Transport) => Some("check the server URL and network"),
            (UiErrorContext::Download, UiErrorCategory::Filesystem) => {
                Some("check that the download folder is writable")
            }
            _ => None,
        }
    }

    pub fn display_message(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{} ({hint})", self.message),
            None => self.message.clone(),
        }
    }
}
