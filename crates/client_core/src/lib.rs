//! Client side of the academicplot processing service.
//!
//! - [`controller`] holds the UI state machine shared by every front end.
//! - [`stream`] decodes the `data: <JSON>` response stream.
//! - [`ProcessClient`] talks to the server over HTTP.

pub mod config;
pub mod controller;
pub mod stream;

mod client;

pub use client::{resolve_link, run_request, ProcessClient, ProcessingService, RunUpdate};
pub use controller::{ProcessRequest, UploadController};
pub use stream::{consume_stream, decode_line, LineDecoder, RunOutcome};
