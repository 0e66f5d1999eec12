//! Wire contract of the `/process` endpoint: multipart request fields and the
//! `data: <JSON>` event lines streamed back.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Layout, PaperFormat, VectorFormat},
    error::ClientError,
};

/// Literal prefix of every event line in the response stream.
pub const EVENT_LINE_PREFIX: &str = "data: ";
pub const PROCESS_PATH: &str = "/process";
pub const PAPER_FORMATS_PATH: &str = "/api/paper_formats";

/// Snapshot of the option panel taken when a run starts. Nested groups are
/// `Some` only while their enabling toggle is on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessOptions {
    pub beautify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic: Option<AcademicOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicOptions {
    pub paper_format: PaperFormat,
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_format: Option<VectorFormat>,
    pub dpi: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomParams {
    pub font_size: u32,
    pub title_size: u32,
    pub fig_width: f32,
    pub fig_height: f32,
    pub custom_dpi: u32,
}

impl ProcessOptions {
    /// Text form fields sent next to the `file` part, in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("beautify", self.beautify.to_string()),
            ("academic_mode", self.academic.is_some().to_string()),
        ];

        let Some(academic) = &self.academic else {
            return fields;
        };

        fields.push(("paper_format", academic.paper_format.as_str().to_string()));
        fields.push(("layout", academic.layout.as_str().to_string()));
        fields.push((
            "vector_format",
            academic
                .vector_format
                .map(|format| format.as_str().to_string())
                .unwrap_or_default(),
        ));
        fields.push(("dpi", academic.dpi.to_string()));
        fields.push(("custom_mode", academic.custom.is_some().to_string()));

        if let Some(custom) = &academic.custom {
            fields.push(("font_size", custom.font_size.to_string()));
            fields.push(("title_size", custom.title_size.to_string()));
            fields.push(("fig_width", custom.fig_width.to_string()));
            fields.push(("fig_height", custom.fig_height.to_string()));
            fields.push(("custom_dpi", custom.custom_dpi.to_string()));
        }

        fields
    }
}

/// Raw JSON object carried by one `data: ` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Status(String),
    Error(String),
    Success {
        download_url: String,
        message: Option<String>,
    },
}

impl StreamPayload {
    /// Parses the JSON after `data: `. A string `error` field is kept even
    /// when sibling fields carry unexpected types.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|err| ClientError::malformed_event(format!("invalid event payload: {err}")))?;

        if let Some(error) = value.get("error").and_then(serde_json::Value::as_str) {
            return Ok(Self {
                error: Some(error.to_string()),
                ..Self::default()
            });
        }

        serde_json::from_value(value)
            .map_err(|err| ClientError::malformed_event(format!("invalid event payload: {err}")))
    }

    /// Resolves the payload to a single event. `error` outranks `success`,
    /// which outranks `status`; an empty object yields `None`.
    pub fn into_event(self) -> Result<Option<StreamEvent>, ClientError> {
        if let Some(error) = self.error {
            return Ok(Some(StreamEvent::Error(error)));
        }

        if self.success == Some(true) {
            let download_url = self.download_url.ok_or_else(|| {
                ClientError::malformed_event("success event without download_url")
            })?;
            return Ok(Some(StreamEvent::Success {
                download_url,
                message: self.message,
            }));
        }

        Ok(self.status.map(StreamEvent::Status))
    }
}

/// Entry of the server's `/api/paper_formats` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperFormatInfo {
    pub name: String,
    pub single_column: (f32, f32),
    pub double_column: (f32, f32),
    #[serde(default)]
    pub font_family: Vec<String>,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
    pub legend_size: u32,
    pub dpi: u32,
}
