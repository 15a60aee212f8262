//! Optimization reports written to disk
//!
//! - **HTML**: standalone page with the health gauge and one card per suggestion
//! - **JSON**: identical to the AI-view export
//! - **CSV**: one row per suggestion for spreadsheets
//!
//! # Usage
//!
//! ```ignore
//! use dbsmart::report;
//!
//! // Format follows the extension
//! report::generate("report.html", &suggestions)?;
//! report::generate("report.json", &suggestions)?;
//! report::generate("report.csv", &suggestions)?;
//! ```

pub mod html;

use crate::error::Result;
use crate::export;
use crate::model::{Severity, Suggestion};
use crate::score::{self, HealthBand};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Generate a report in the format matching the file extension
pub fn generate<P: AsRef<Path>>(path: P, suggestions: &[Suggestion]) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, suggestions)?,
        "json" => file.write_all(export::suggestions_json(suggestions)?.as_bytes())?,
        _ => write_csv(&mut file, suggestions)?,
    }
    Ok(())
}

/// Counts per severity plus the derived score
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub critical: usize,
    pub moderate: usize,
    pub good: usize,
    pub score: u8,
    pub band: HealthBand,
}

impl Summary {
    pub fn from_suggestions(suggestions: &[Suggestion]) -> Self {
        let count = |sev: Severity| suggestions.iter().filter(|s| s.severity == sev).count();
        let score = score::score(suggestions);

        Self {
            total: suggestions.len(),
            critical: count(Severity::Critical),
            moderate: count(Severity::Moderate),
            good: count(Severity::Good),
            score,
            band: HealthBand::from_score(score),
        }
    }
}

pub fn write_csv<W: Write>(writer: &mut W, suggestions: &[Suggestion]) -> std::io::Result<()> {
    writeln!(writer, "category,severity,suggestion,rationale")?;
    for s in suggestions {
        writeln!(
            writer,
            "{},{},{},{}",
            csv_field(s.category.as_str()),
            csv_field(s.severity.as_str()),
            csv_field(&s.text),
            csv_field(&s.rationale)
        )?;
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn suggestion(severity: Severity, text: &str) -> Suggestion {
        Suggestion {
            category: Category::Indexing,
            text: text.to_string(),
            rationale: "because".to_string(),
            severity,
        }
    }

    // ==========================================================================
    // SUMMARY STATISTICS TESTS
    // ==========================================================================

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_suggestions(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.critical, 0);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.band, HealthBand::Poor);
    }

    #[test]
    fn test_summary_mixed() {
        let list = vec![
            suggestion(Severity::Critical, "a"),
            suggestion(Severity::Moderate, "b"),
            suggestion(Severity::Good, "c"),
            suggestion(Severity::Good, "d"),
        ];
        let summary = Summary::from_suggestions(&list);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.moderate, 1);
        assert_eq!(summary.good, 2);
        assert_eq!(summary.score, 80);
        assert_eq!(summary.band, HealthBand::Fair);
    }

    // ==========================================================================
    // FORMAT SELECTION
    // ==========================================================================

    #[test]
    fn test_csv_quoting() {
        let list = vec![suggestion(Severity::Moderate, "Use \"BIGINT\", not INT")];
        let mut out = Vec::new();
        write_csv(&mut out, &list).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "category,severity,suggestion,rationale\nIndexing,Moderate,\"Use \"\"BIGINT\"\", not INT\",because\n"
        );
    }

    #[test]
    fn test_generate_json_matches_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let list = vec![suggestion(Severity::Critical, "Add PK")];

        generate(&path, &list).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, export::suggestions_json(&list).unwrap());
    }

    #[test]
    fn test_generate_html_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.HTML");

        generate(&path, &[suggestion(Severity::Good, "Looks fine")]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.contains("Looks fine"));
    }

    #[test]
    fn test_generate_defaults_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        generate(&path, &[suggestion(Severity::Good, "x")]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("category,severity,suggestion,rationale\n"));
    }
}
