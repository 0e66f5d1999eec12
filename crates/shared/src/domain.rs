use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Required suffix for uploads accepted by the processing endpoint.
pub const UPLOAD_EXTENSION: &str = ".py";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(RunId);
id_newtype!(NotificationId);

impl RunId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    #[default]
    Idle,
    Processing,
}

/// The file the user picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl Selection {
    pub fn new(name: impl Into<String>, size_bytes: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            path: path.into(),
        }
    }

    /// Builds a selection from a file on disk, reading its size from metadata.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            size_bytes: metadata.len(),
            path,
        })
    }

    pub fn formatted_size(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

pub fn is_supported_upload(filename: &str) -> bool {
    filename.ends_with(UPLOAD_EXTENSION)
}

/// Formats a byte count with base-1024 units and at most two decimals,
/// dropping trailing zeros ("1.5 KB", "1 MB", "0 Bytes").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let value_text = format!("{value:.2}");
    let compact_value = value_text.trim_end_matches('0').trim_end_matches('.');
    format!("{compact_value} {}", UNITS[unit])
}

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == value)
                    .ok_or_else(|| format!("unknown {} '{value}'", stringify!($name)))
            }
        }
    };
}

wire_enum!(PaperFormat {
    Nature => "nature",
    Neurips => "neurips",
    Cvpr => "cvpr",
    Science => "science",
    Ieee => "ieee",
});

wire_enum!(Layout {
    Single => "single",
    Double => "double",
});

wire_enum!(VectorFormat {
    Svg => "svg",
    Pdf => "pdf",
    Eps => "eps",
});

impl Default for PaperFormat {
    fn default() -> Self {
        Self::Nature
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::Single
    }
}

impl PaperFormat {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Nature => "Nature",
            Self::Neurips => "NeurIPS",
            Self::Cvpr => "CVPR",
            Self::Science => "Science",
            Self::Ieee => "IEEE",
        }
    }
}
