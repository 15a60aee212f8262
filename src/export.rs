//! Export of the active view's content
//!
//! A pure transform: nothing here touches the network, and nothing is written
//! unless the caller asks for it with [`ExportFile::write_to`].

use crate::error::{Error, Result};
use crate::model::{Suggestion, View};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub content: String,
}

impl ExportFile {
    /// Write into `dir` under the export's file name.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.filename);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Pretty JSON for a suggestion list, two-space indented.
pub fn suggestions_json(suggestions: &[Suggestion]) -> Result<String> {
    Ok(serde_json::to_string_pretty(suggestions)?)
}

pub fn prepare(view: View, schema: &str, diagram: &str, suggestions: &[Suggestion]) -> Result<ExportFile> {
    let file = match view {
        View::Sql if !schema.trim().is_empty() => ExportFile {
            filename: "schema.sql",
            mime_type: "application/sql",
            content: schema.to_string(),
        },
        View::Er if !diagram.trim().is_empty() => ExportFile {
            filename: "diagram.txt",
            mime_type: "text/plain",
            content: diagram.to_string(),
        },
        View::Ai if !suggestions.is_empty() => ExportFile {
            filename: "optimizations.json",
            mime_type: "application/json",
            content: suggestions_json(suggestions)?,
        },
        _ => return Err(Error::ExportEmpty),
    };
    Ok(file)
}
