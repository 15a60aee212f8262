//! Data model shared by the dashboard, the CLI and the AI layer
//!
//! Wire names match what the completion service is asked to produce and what
//! the browser page sends, so these types serialize straight onto the API.

use crate::error::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ============================================================================
// Suggestions
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Normalization,
    Indexing,
    #[serde(rename = "Query Optimization", alias = "QueryOptimization")]
    QueryOptimization,
    Storage,
    #[serde(rename = "Data Types", alias = "DataTypes")]
    DataTypes,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Normalization,
        Category::Indexing,
        Category::QueryOptimization,
        Category::Storage,
        Category::DataTypes,
        Category::Other,
    ];

    /// Name used on the wire and in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Normalization => "Normalization",
            Category::Indexing => "Indexing",
            Category::QueryOptimization => "Query Optimization",
            Category::Storage => "Storage",
            Category::DataTypes => "Data Types",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a suggestion. Ordered Critical > Moderate > Good.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    Moderate,
    Good,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Moderate, Severity::Good];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Moderate => "Moderate",
            Severity::Good => "Good",
        }
    }

    /// Label shown on the suggestion badge.
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Moderate => "Moderate",
            Severity::Good => "Good Practice",
        }
    }

    /// Points taken off the health score for one suggestion of this severity.
    pub fn deduction(&self) -> u32 {
        match self {
            Severity::Critical => 15,
            Severity::Moderate => 5,
            Severity::Good => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optimization suggestion. Field order here is the export field order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    pub category: Category,
    #[serde(rename = "suggestion")]
    pub text: String,
    pub rationale: String,
    pub severity: Severity,
}

// ============================================================================
// Input
// ============================================================================

/// Extensions accepted by the file picker, with the media type each maps to.
pub const ACCEPTED_FILES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("sql", "application/sql"),
];

/// Media type for a file name, if the extension is one we accept.
pub fn media_type_for(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    ACCEPTED_FILES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn is_accepted_media_type(mime: &str) -> bool {
    ACCEPTED_FILES.iter().any(|(_, m)| *m == mime)
}

/// A file the user uploaded. Image content is base64, everything else is text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub content: String,
}

impl UploadedFile {
    /// Build from raw bytes, inferring the media type from the file name.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let mime = media_type_for(name).ok_or_else(|| Error::UnsupportedFile(name.to_string()))?;

        let content = if mime.starts_with("image/") {
            base64::engine::general_purpose::STANDARD.encode(bytes)
        } else {
            String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::UnsupportedFile(format!("{name} is not valid UTF-8 text")))?
        };

        Ok(Self {
            name: name.to_string(),
            mime_type: mime.to_string(),
            content,
        })
    }

    /// Read a file from disk in one go.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        // Reject before reading so a huge unsupported file costs nothing.
        if media_type_for(&name).is_none() {
            return Err(Error::UnsupportedFile(name));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&name, &bytes)
    }

    /// Check a file that arrived already encoded (from the browser).
    pub fn validate(self) -> Result<Self> {
        if !is_accepted_media_type(&self.mime_type) {
            return Err(Error::UnsupportedFile(self.mime_type));
        }
        if self.is_image()
            && base64::engine::general_purpose::STANDARD
                .decode(self.content.as_bytes())
                .is_err()
        {
            return Err(Error::UnsupportedFile(format!(
                "{} is not valid base64 image data",
                self.name
            )));
        }
        Ok(self)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Input for ER→SQL: either an uploaded file or text typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputArtifact {
    File(UploadedFile),
    Text(String),
}

impl InputArtifact {
    /// Short label for the UI.
    pub fn label(&self) -> &str {
        match self {
            InputArtifact::File(f) => &f.name,
            InputArtifact::Text(_) => "text-input",
        }
    }
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    #[serde(rename = "ER")]
    Er,
    #[serde(rename = "SQL")]
    Sql,
    #[serde(rename = "AI")]
    Ai,
}

impl View {
    /// Label of the header button that drives this view.
    pub fn primary_action(&self) -> &'static str {
        match self {
            View::Er => "Generate SQL",
            View::Sql => "Generate ER",
            View::Ai => "Optimize",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
