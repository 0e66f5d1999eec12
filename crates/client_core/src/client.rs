use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::{RunId, Selection},
    error::{ClientError, ServerErrorBody},
    protocol::{PaperFormatInfo, ProcessOptions, PAPER_FORMATS_PATH, PROCESS_PATH},
};
use tracing::{info, warn};
use url::Url;

use crate::{
    controller::ProcessRequest,
    stream::{consume_stream, RunOutcome},
};

const UPLOAD_MIME_TYPE: &str = "text/x-python";
const DEFAULT_DOWNLOAD_NAME: &str = "result";

/// Transport used to execute processing runs. Front ends hold it as
/// `Arc<dyn ProcessingService>` so tests can substitute their own.
#[async_trait]
pub trait ProcessingService: Send + Sync {
    async fn process(
        &self,
        selection: &Selection,
        options: &ProcessOptions,
        on_status: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> RunOutcome;

    async fn download(&self, download_url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Progress of one run as reported by [`run_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunUpdate {
    Status { run_id: RunId, message: String },
    Finished { run_id: RunId, outcome: RunOutcome },
}

/// Executes a request produced by `UploadController::start_processing`,
/// forwarding every status and exactly one `Finished` update.
pub async fn run_request(
    service: &dyn ProcessingService,
    request: ProcessRequest,
    mut on_update: impl FnMut(RunUpdate) + Send,
) -> RunOutcome {
    let run_id = request.run_id;
    info!(run_id = run_id.0, file = %request.selection.name, "processing run started");

    let outcome = {
        let mut forward_status = |message: &str| {
            on_update(RunUpdate::Status {
                run_id,
                message: message.to_string(),
            })
        };
        service
            .process(&request.selection, &request.options, &mut forward_status)
            .await
    };

    info!(
        run_id = run_id.0,
        success = outcome.is_success(),
        "processing run finished"
    );
    on_update(RunUpdate::Finished {
        run_id,
        outcome: outcome.clone(),
    });
    outcome
}

pub struct ProcessClient {
    http: Client,
    server_url: Url,
}

impl ProcessClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_connect_timeout(server_url, None)
    }

    /// The timeout bounds connection setup only; a run may stream for as long
    /// as the server keeps sending.
    pub fn with_connect_timeout(
        server_url: &str,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let server_url = parse_base_url(server_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ClientError::transport(format!("failed to build http client: {err}")))?;
        Ok(Self { http, server_url })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.server_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::transport(format!("invalid endpoint '{path}': {err}")))
    }

    /// Resolves a server-provided link, which is usually host-relative
    /// (`/download/<name>`).
    pub fn resolve(&self, link: &str) -> Result<Url, ClientError> {
        self.server_url
            .join(link)
            .map_err(|err| ClientError::transport(format!("invalid link '{link}': {err}")))
    }

    pub async fn build_form(
        selection: &Selection,
        options: &ProcessOptions,
    ) -> Result<Form, ClientError> {
        let contents = tokio::fs::read(&selection.path).await.map_err(|err| {
            ClientError::transport(format!(
                "failed to read '{}': {err}",
                selection.path.display()
            ))
        })?;
        let file_part = Part::bytes(contents)
            .file_name(selection.name.clone())
            .mime_str(UPLOAD_MIME_TYPE)
            .map_err(|err| ClientError::transport(format!("invalid upload part: {err}")))?;

        let mut form = Form::new().part("file", file_part);
        for (name, value) in options.form_fields() {
            form = form.text(name, value);
        }
        Ok(form)
    }

    pub async fn process(
        &self,
        selection: &Selection,
        options: &ProcessOptions,
        on_status: impl FnMut(&str),
    ) -> RunOutcome {
        match self.open_stream(selection, options).await {
            Ok(response) => consume_stream(response.bytes_stream(), on_status).await,
            Err(err) => {
                warn!("processing request failed: {}", err.message);
                RunOutcome::TransportFailure(err.message)
            }
        }
    }

    async fn open_stream(
        &self,
        selection: &Selection,
        options: &ProcessOptions,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint(PROCESS_PATH)?;
        let form = Self::build_form(selection, options).await?;
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| ClientError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ServerErrorBody>(&body) {
            Ok(body) => format!("server responded with {status}: {}", body.error),
            Err(_) => format!("server responded with {status}"),
        };
        Err(ClientError::transport(message))
    }

    pub async fn download(&self, download_url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let url = self.resolve(download_url)?;
        let file_name = url
            .path_segments()
            .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| segment.to_string())
            })
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string());
        if file_name.contains("..") || file_name.contains(['/', '\\']) {
            return Err(anyhow!("refusing to write download named '{file_name}'"));
        }

        let bytes = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await
            .with_context(|| format!("failed to read download body from {url}"))?;

        tokio::fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("failed to create '{}'", dest_dir.display()))?;
        let target = dest_dir.join(&file_name);
        tokio::fs::write(&target, &bytes)
            .await
            .with_context(|| format!("failed to write '{}'", target.display()))?;
        info!(url = %url, path = %target.display(), bytes = bytes.len(), "result downloaded");
        Ok(target)
    }

    pub async fn paper_formats(&self) -> Result<BTreeMap<String, PaperFormatInfo>> {
        let formats = self
            .http
            .get(self.endpoint(PAPER_FORMATS_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(formats)
    }
}

#[async_trait]
impl ProcessingService for ProcessClient {
    async fn process(
        &self,
        selection: &Selection,
        options: &ProcessOptions,
        on_status: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> RunOutcome {
        ProcessClient::process(self, selection, options, |status| on_status(status)).await
    }

    async fn download(&self, download_url: &str, dest_dir: &Path) -> Result<PathBuf> {
        ProcessClient::download(self, download_url, dest_dir).await
    }
}

/// Resolves a server-provided link against `server_url` without building a
/// client.
pub fn resolve_link(server_url: &str, link: &str) -> Result<Url, ClientError> {
    parse_base_url(server_url)?
        .join(link)
        .map_err(|err| ClientError::transport(format!("invalid link '{link}': {err}")))
}

/// Parses the configured server url and gives it a trailing slash so that
/// endpoint paths join below any path prefix.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let mut url = Url::parse(&with_scheme)
        .map_err(|err| ClientError::transport(format!("invalid server url '{raw}': {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
