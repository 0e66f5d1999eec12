//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::ProcessRequest;

#[derive(Debug)]
pub enum BackendCommand {
    StartRun(ProcessRequest),
    Download {
        download_url: String,
        dest_dir: PathBuf,
    },
    SetServerUrl {
        server_url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartRun(_) => "start_run",
            Self::Download { .. } => "download",
            Self::SetServerUrl { .. } => "set_server_url",
        }
    }
}
