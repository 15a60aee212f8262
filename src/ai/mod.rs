//! AI operations: build a request, send it to the completion service, parse
//! the reply.
//!
//! The three operations share one shape:
//!
//! ```text
//! input ──prompt::build──▶ CompletionRequest ──service──▶ raw text ──parse──▶ Output
//! ```
//!
//! Input validation happens in the prompt builder, so a missing input never
//! reaches the network. Anything that goes wrong after that point (transport,
//! service status, unparseable reply) is logged and collapsed into a single
//! [`Error::OperationFailed`] for that operation.

pub mod gemini;
pub mod parse;
pub mod prompt;

use crate::error::{Error, Result};
use crate::model::{InputArtifact, Suggestion, View};
use serde::Serialize;
use std::fmt;

/// The three things the dashboard can ask the AI to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// ER diagram (image or text) → SQL schema
    GenerateSql,
    /// SQL schema → Mermaid ER diagram
    GenerateEr,
    /// SQL schema → optimization suggestions
    Optimize,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::GenerateSql => "Failed to generate SQL.",
            Operation::GenerateEr => "Failed to generate ER Diagram.",
            Operation::Optimize => "Failed to get optimization suggestions.",
        }
    }

    /// View that shows this operation's output.
    pub fn target_view(&self) -> View {
        match self {
            Operation::GenerateSql => View::Sql,
            Operation::GenerateEr => View::Er,
            Operation::Optimize => View::Ai,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::GenerateSql => "generate-sql",
            Operation::GenerateEr => "generate-er",
            Operation::Optimize => "optimize",
        })
    }
}

/// One content part of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Binary payload, base64-encoded, tagged with its media type.
    InlineData { mime_type: String, data: String },
}

/// A request for the completion service, independent of any vendor wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub operation: Operation,
    pub parts: Vec<Part>,
    /// When set, the service must reply with JSON matching this schema.
    pub response_schema: Option<serde_json::Value>,
}

/// Anything that can turn a [`CompletionRequest`] into text.
pub trait CompletionService: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Parsed result of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Sql(String),
    Diagram(String),
    Suggestions(Vec<Suggestion>),
}

/// Send a built request and parse the reply for its operation.
pub fn execute(service: &dyn CompletionService, request: &CompletionRequest) -> Result<Output> {
    let op = request.operation;
    tracing::info!(operation = %op, parts = request.parts.len(), "sending completion request");

    let raw = service.complete(request).map_err(|e| match e {
        // Missing credentials are a configuration problem, not a flaky call.
        Error::ConfigMissing(var) => Error::ConfigMissing(var),
        other => {
            tracing::error!(operation = %op, error = %other, "completion request failed");
            Error::OperationFailed(op)
        }
    })?;
    tracing::debug!(operation = %op, "raw completion output:\n{}", raw);

    let output = match op {
        Operation::GenerateSql => Output::Sql(parse::parse_sql(&raw)),
        Operation::GenerateEr => Output::Diagram(parse::parse_diagram(&raw)),
        Operation::Optimize => {
            let suggestions = parse::parse_suggestions(&raw).map_err(|e| {
                tracing::error!(operation = %op, error = %e, "could not parse suggestions");
                Error::OperationFailed(op)
            })?;
            tracing::info!(operation = %op, count = suggestions.len(), "parsed suggestions");
            Output::Suggestions(suggestions)
        }
    };

    Ok(output)
}

/// ER diagram (file or typed text) → SQL schema.
pub fn generate_sql(service: &dyn CompletionService, input: Option<&InputArtifact>) -> Result<String> {
    let request = prompt::sql_request(input)?;
    match execute(service, &request)? {
        Output::Sql(sql) => Ok(sql),
        _ => Err(Error::OperationFailed(Operation::GenerateSql)),
    }
}

/// SQL schema → Mermaid ER diagram.
pub fn generate_er(service: &dyn CompletionService, schema: &str) -> Result<String> {
    let request = prompt::er_request(schema)?;
    match execute(service, &request)? {
        Output::Diagram(diagram) => Ok(diagram),
        _ => Err(Error::OperationFailed(Operation::GenerateEr)),
    }
}

/// SQL schema → optimization suggestions.
pub fn optimize(service: &dyn CompletionService, schema: &str) -> Result<Vec<Suggestion>> {
    let request = prompt::optimize_request(schema)?;
    match execute(service, &request)? {
        Output::Suggestions(suggestions) => Ok(suggestions),
        _ => Err(Error::OperationFailed(Operation::Optimize)),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeService, Unconfigured};
    use super::*;
    use crate::model::{Category, Severity, UploadedFile};

    // ==========================================================================
    // INPUT GATING
    // ==========================================================================
    //
    // A missing input must be caught before anything is sent.
    // ==========================================================================

    #[test]
    fn test_generate_sql_without_input_makes_no_call() {
        let service = FakeService::replying("CREATE TABLE t(x int);");
        let err = generate_sql(&service, None).unwrap_err();

        assert!(matches!(err, Error::InputMissing(_)));
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn test_generate_er_with_empty_schema_makes_no_call() {
        let service = FakeService::replying("erDiagram");
        let err = generate_er(&service, "").unwrap_err();

        assert!(matches!(err, Error::InputMissing(_)));
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn test_optimize_with_empty_schema_makes_no_call() {
        let service = FakeService::replying("[]");
        let err = optimize(&service, "   \n").unwrap_err();

        assert!(matches!(err, Error::InputMissing(_)));
        assert_eq!(service.call_count(), 0);
    }

    // ==========================================================================
    // END-TO-END THROUGH A FAKE SERVICE
    // ==========================================================================

    #[test]
    fn test_generate_sql_strips_fences() {
        let service = FakeService::replying("```sql\nCREATE TABLE users (id INT PRIMARY KEY);\n```");
        let input = InputArtifact::Text("User has id".to_string());

        let sql = generate_sql(&service, Some(&input)).unwrap();
        assert_eq!(sql, "CREATE TABLE users (id INT PRIMARY KEY);");
        assert_eq!(service.call_count(), 1);
    }

    #[test]
    fn test_generate_sql_sends_image_inline() {
        let service = FakeService::replying("CREATE TABLE a (id INT);");
        let file = UploadedFile {
            name: "er.png".to_string(),
            mime_type: "image/png".to_string(),
            content: "iVBORw==".to_string(),
        };

        generate_sql(&service, Some(&InputArtifact::File(file))).unwrap();

        let request = service.last_request().unwrap();
        assert_eq!(request.parts.len(), 2);
        assert_eq!(
            request.parts[1],
            Part::InlineData { mime_type: "image/png".to_string(), data: "iVBORw==".to_string() }
        );
    }

    #[test]
    fn test_generate_er_returns_diagram() {
        let service = FakeService::replying("```mermaid\nerDiagram\n  USERS ||--o{ ORDERS : places\n```");
        let diagram = generate_er(&service, "CREATE TABLE users (id INT);").unwrap();
        assert_eq!(diagram, "erDiagram\n  USERS ||--o{ ORDERS : places");
    }

    #[test]
    fn test_optimize_parses_suggestions_and_sends_schema() {
        let service = FakeService::replying(
            r#"[{"category":"Indexing","suggestion":"Index orders.user_id","rationale":"Join column","severity":"Critical"}]"#,
        );
        let suggestions = optimize(&service, "CREATE TABLE orders (user_id INT);").unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, Category::Indexing);
        assert_eq!(suggestions[0].severity, Severity::Critical);
        assert!(service.last_request().unwrap().response_schema.is_some());
    }

    // ==========================================================================
    // FAILURE MAPPING
    // ==========================================================================

    #[test]
    fn test_transport_failure_becomes_operation_failed() {
        let service = FakeService::failing("connection reset");
        let err = generate_er(&service, "CREATE TABLE t (x INT);").unwrap_err();
        assert!(matches!(err, Error::OperationFailed(Operation::GenerateEr)));
    }

    #[test]
    fn test_malformed_suggestions_become_operation_failed() {
        let service = FakeService::replying("not json at all");
        let err = optimize(&service, "CREATE TABLE t (x INT);").unwrap_err();
        assert!(matches!(err, Error::OperationFailed(Operation::Optimize)));
    }

    #[test]
    fn test_missing_config_passes_through() {
        let err = generate_er(&Unconfigured, "CREATE TABLE t (x INT);").unwrap_err();
        assert!(matches!(err, Error::ConfigMissing("GEMINI_API_KEY")));
    }

    #[test]
    fn test_target_views() {
        assert_eq!(Operation::GenerateSql.target_view(), View::Sql);
        assert_eq!(Operation::GenerateEr.target_view(), View::Er);
        assert_eq!(Operation::Optimize.target_view(), View::Ai);
    }
}
