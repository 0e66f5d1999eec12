//! Incremental decoding of the `/process` response body.
//!
//! The body is a chunked text stream of `data: <JSON>` lines. Chunk boundaries
//! carry no meaning: a line may be split across any number of chunks, and one
//! chunk may hold several lines. [`LineDecoder`] reassembles lines and
//! [`consume_stream`] dispatches them until the first terminal event.

use std::fmt::Display;

use futures::{pin_mut, Stream, StreamExt};
use shared::{
    error::ClientError,
    protocol::{StreamEvent, StreamPayload, EVENT_LINE_PREFIX},
};
use tracing::{debug, warn};

/// Splits a byte stream into newline-terminated lines, keeping the trailing
/// partial line buffered until the rest of it arrives.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|byte| *byte == b'\n') {
            let end = start + offset;
            lines.push(decode_utf8_line(&self.buffer[start..end]));
            start = end + 1;
        }
        self.buffer.drain(..start);
        lines
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Flushes an unterminated final line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = decode_utf8_line(&self.buffer);
        self.buffer.clear();
        Some(line)
    }
}

fn decode_utf8_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decodes one response line. Lines without the `data: ` prefix are framing
/// and yield `Ok(None)`.
pub fn decode_line(line: &str) -> Result<Option<StreamEvent>, ClientError> {
    let Some(payload) = line.strip_prefix(EVENT_LINE_PREFIX) else {
        return Ok(None);
    };

    StreamPayload::parse(payload)?.into_event()
}

/// How a processing run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded {
        download_url: String,
        message: Option<String>,
    },
    ServerError(String),
    TransportFailure(String),
    /// The body ended without an error or success event.
    StreamEnded,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::Succeeded { download_url, .. } => Some(download_url),
            _ => None,
        }
    }

    /// The failure a run ended with, `None` on success.
    pub fn error(&self) -> Option<ClientError> {
        match self {
            Self::Succeeded { .. } => None,
            Self::ServerError(message) => Some(ClientError::server_reported(message.clone())),
            Self::TransportFailure(message) => Some(ClientError::transport(message.clone())),
            Self::StreamEnded => Some(ClientError::transport(
                "response ended without a result event",
            )),
        }
    }
}

/// Reads `stream` chunk by chunk, reporting status events through
/// `on_status`, and returns at the first terminal event without polling the
/// stream again.
pub async fn consume_stream<S, B, E>(stream: S, mut on_status: impl FnMut(&str)) -> RunOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    pin_mut!(stream);
    let mut decoder = LineDecoder::new();
    let mut chunks_read = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(chunks_read, "response stream failed: {err}");
                return RunOutcome::TransportFailure(err.to_string());
            }
        };
        chunks_read += 1;

        for line in decoder.push(chunk.as_ref()) {
            if let Some(outcome) = dispatch_line(&line, &mut on_status) {
                debug!(chunks_read, "response stream reached a terminal event");
                return outcome;
            }
        }
    }

    if let Some(line) = decoder.finish() {
        if let Some(outcome) = dispatch_line(&line, &mut on_status) {
            return outcome;
        }
    }

    warn!(chunks_read, "response stream ended without a terminal event");
    RunOutcome::StreamEnded
}

fn dispatch_line(line: &str, on_status: &mut impl FnMut(&str)) -> Option<RunOutcome> {
    match decode_line(line) {
        Ok(None) => None,
        Ok(Some(StreamEvent::Status(message))) => {
            debug!(status = %message, "processing status");
            on_status(&message);
            None
        }
        Ok(Some(StreamEvent::Error(message))) => Some(RunOutcome::ServerError(message)),
        Ok(Some(StreamEvent::Success {
            download_url,
            message,
        })) => Some(RunOutcome::Succeeded {
            download_url,
            message,
        }),
        Err(err) => {
            warn!(line, "skipping malformed event: {}", err.message);
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/stream_tests.rs"]
mod tests;
