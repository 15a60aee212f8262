//! Post-processing of completion text.
//!
//! SQL and diagram replies only lose their markdown fences; nothing checks
//! that what remains is valid SQL or Mermaid. Suggestions are strict: the
//! reply must be a JSON array whose every element is a complete suggestion.

use crate::error::Result;
use crate::model::Suggestion;

const FENCE: &str = "```";

/// Remove one leading fence line (with or without a language tag) and one
/// trailing fence, then trim.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        // Everything up to the first newline is the language tag.
        text = match rest.find('\n') {
            Some(nl) if is_language_tag(&rest[..nl]) => &rest[nl + 1..],
            Some(_) => rest,
            None if is_language_tag(rest) => "",
            None => rest,
        };
    }

    let text = text.trim_end();
    let text = text.strip_suffix(FENCE).unwrap_or(text);
    text.trim()
}

fn is_language_tag(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}

pub fn parse_sql(raw: &str) -> String {
    strip_fences(raw).to_string()
}

pub fn parse_diagram(raw: &str) -> String {
    strip_fences(raw).to_string()
}

pub fn parse_suggestions(raw: &str) -> Result<Vec<Suggestion>> {
    let suggestions: Vec<Suggestion> = serde_json::from_str(raw.trim())?;
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Category, Severity};

    // ==========================================================================
    // FENCE STRIPPING
    // ==========================================================================
    //
    // Models like to wrap code in ```sql ... ``` even when told not to.
    // ==========================================================================

    #[test]
    fn test_strip_sql_fence() {
        assert_eq!(
            strip_fences("```sql\nCREATE TABLE t(x int);\n```"),
            "CREATE TABLE t(x int);"
        );
    }

    #[test]
    fn test_strip_mermaid_fence() {
        assert_eq!(
            strip_fences("```mermaid\nerDiagram\n    A ||--o{ B : has\n```\n"),
            "erDiagram\n    A ||--o{ B : has"
        );
    }

    #[test]
    fn test_strip_bare_fence() {
        assert_eq!(strip_fences("```\nSELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn test_unfenced_text_is_trimmed_only() {
        assert_eq!(strip_fences("  \nerDiagram\n  A {\n  }\n\n"), "erDiagram\n  A {\n  }");
    }

    #[test]
    fn test_fence_on_same_line_as_code() {
        assert_eq!(strip_fences("```SELECT 1;```"), "SELECT 1;");
    }

    #[test]
    fn test_only_outer_fences_removed() {
        let raw = "```sql\n-- ``` inside a comment\nSELECT 1;\n```";
        assert_eq!(strip_fences(raw), "-- ``` inside a comment\nSELECT 1;");
    }

    #[test]
    fn test_empty_reply() {
        assert_eq!(strip_fences(""), "");
        assert_eq!(strip_fences("```sql\n```"), "");
    }

    #[test]
    fn test_parse_sql_and_diagram_are_verbatim() {
        assert_eq!(parse_sql("not really sql"), "not really sql");
        assert_eq!(parse_diagram("```\nerDiagram\n```"), "erDiagram");
    }

    // ==========================================================================
    // SUGGESTIONS
    // ==========================================================================

    #[test]
    fn test_parse_valid_suggestions() {
        let raw = r#"
            [
              {"category": "Normalization", "suggestion": "Split address", "rationale": "Repeated groups", "severity": "Moderate"},
              {"category": "Data Types", "suggestion": "Use DATE", "rationale": "Stored as text", "severity": "Good"}
            ]
        "#;
        let suggestions = parse_suggestions(raw).unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].category, Category::Normalization);
        assert_eq!(suggestions[0].text, "Split address");
        assert_eq!(suggestions[1].category, Category::DataTypes);
        assert_eq!(suggestions[1].severity, Severity::Good);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_suggestions("[]").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_severity_is_parse_error() {
        let raw = r#"[{"category":"Indexing","suggestion":"x","rationale":"y","severity":"Severe"}]"#;
        assert!(matches!(parse_suggestions(raw), Err(Error::Parse(_))));
    }

    #[test]
    fn test_unknown_category_is_parse_error() {
        let raw = r#"[{"category":"Security","suggestion":"x","rationale":"y","severity":"Good"}]"#;
        assert!(matches!(parse_suggestions(raw), Err(Error::Parse(_))));
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let raw = r#"[{"category":"Indexing","suggestion":"x","severity":"Good"}]"#;
        assert!(matches!(parse_suggestions(raw), Err(Error::Parse(_))));
    }

    #[test]
    fn test_no_partial_recovery() {
        // One bad element fails the whole reply
        let raw = r#"[
            {"category":"Indexing","suggestion":"a","rationale":"b","severity":"Good"},
            {"category":"Indexing","suggestion":"c","rationale":"d","severity":"Low"}
        ]"#;
        assert!(parse_suggestions(raw).is_err());
    }

    #[test]
    fn test_non_array_is_parse_error() {
        let raw = r#"{"category":"Indexing","suggestion":"x","rationale":"y","severity":"Good"}"#;
        assert!(parse_suggestions(raw).is_err());
        assert!(parse_suggestions("Here are some ideas").is_err());
    }
}
