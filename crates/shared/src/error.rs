use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Selected or dropped file does not carry the `.py` suffix.
    UnsupportedFileType,
    /// Network failure, non-success HTTP status or unreadable response body.
    TransportFailure,
    /// The server emitted an `error` event.
    ServerReportedError,
    /// A `data: ` line whose payload could not be decoded.
    MalformedEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct ClientError {
    pub code: ErrorCode,
    pub message: String,
}

impl ClientError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unsupported_file_type(filename: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedFileType,
            format!("'{filename}' is not a Python source file"),
        )
    }

    pub fn server_reported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServerReportedError, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportFailure, message)
    }

    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedEvent, message)
    }
}

/// JSON body the server returns alongside non-success status codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerErrorBody {
    pub error: String,
}
