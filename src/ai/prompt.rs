//! Request builders for the three AI operations.

use super::{CompletionRequest, Operation, Part};
use crate::error::{Error, Result};
use crate::model::{Category, InputArtifact, Severity};
use serde_json::{json, Value};

pub const MISSING_ER_INPUT: &str = "Please upload or provide an ER diagram description.";
pub const MISSING_SCHEMA: &str = "Please provide an SQL schema.";
pub const MISSING_SCHEMA_TO_OPTIMIZE: &str = "Please provide an SQL schema to optimize.";

pub const SQL_INSTRUCTION: &str = "You are an expert database architect. Analyze the following \
Entity-Relationship Diagram and generate a complete and valid SQL schema (CREATE TABLE statements). \
Include primary keys, foreign keys, appropriate constraints, and sensible data types. The diagram is \
provided as an image or text. Output ONLY the SQL code, with no surrounding text, explanations, or \
markdown formatting.";

pub const ER_INSTRUCTION: &str = "You are an expert database architect. Convert the following SQL \
schema into Mermaid.js ER Diagram syntax. Use standard ERD notation. Only output the Mermaid code \
block, starting with 'erDiagram'. Do not include any other text, explanations, or markdown formatting.";

pub const OPTIMIZE_INSTRUCTION: &str = "You are a world-class database performance expert (DBA). \
Analyze the following SQL schema and provide optimization suggestions. For each suggestion, provide \
a severity level.";

/// ER→SQL. Images go inline next to the instruction; text is appended to it.
pub fn sql_request(input: Option<&InputArtifact>) -> Result<CompletionRequest> {
    let parts = match input {
        Some(InputArtifact::File(file)) if file.is_image() => vec![
            Part::Text(SQL_INSTRUCTION.to_string()),
            Part::InlineData {
                mime_type: file.mime_type.clone(),
                data: file.content.clone(),
            },
        ],
        Some(InputArtifact::File(file)) if !file.content.trim().is_empty() => {
            vec![Part::Text(with_er_content(&file.content))]
        }
        Some(InputArtifact::Text(text)) if !text.trim().is_empty() => {
            vec![Part::Text(with_er_content(text))]
        }
        _ => return Err(Error::InputMissing(MISSING_ER_INPUT)),
    };

    Ok(CompletionRequest {
        operation: Operation::GenerateSql,
        parts,
        response_schema: None,
    })
}

/// SQL→ER.
pub fn er_request(schema: &str) -> Result<CompletionRequest> {
    if schema.trim().is_empty() {
        return Err(Error::InputMissing(MISSING_SCHEMA));
    }
    Ok(CompletionRequest {
        operation: Operation::GenerateEr,
        parts: vec![Part::Text(with_schema(ER_INSTRUCTION, schema))],
        response_schema: None,
    })
}

/// Optimize. Carries a response schema so the reply is a typed JSON array.
pub fn optimize_request(schema: &str) -> Result<CompletionRequest> {
    if schema.trim().is_empty() {
        return Err(Error::InputMissing(MISSING_SCHEMA_TO_OPTIMIZE));
    }
    Ok(CompletionRequest {
        operation: Operation::Optimize,
        parts: vec![Part::Text(with_schema(OPTIMIZE_INSTRUCTION, schema))],
        response_schema: Some(suggestion_schema()),
    })
}

fn with_er_content(content: &str) -> String {
    format!("{SQL_INSTRUCTION}\n\nER Diagram content:\n\n{content}")
}

fn with_schema(instruction: &str, schema: &str) -> String {
    format!("{instruction}\n\nSQL Schema:\n\n{schema}")
}

/// Output schema for suggestions, in the OpenAPI subset the service accepts.
pub fn suggestion_schema() -> Value {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let severities: Vec<&str> = Severity::ALL.iter().map(|s| s.as_str()).collect();

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "category": {
                    "type": "STRING",
                    "enum": categories,
                    "description": "The category of the suggestion.",
                },
                "suggestion": {
                    "type": "STRING",
                    "description": "A concise, actionable optimization suggestion.",
                },
                "rationale": {
                    "type": "STRING",
                    "description": "A brief explanation of why this suggestion is beneficial.",
                },
                "severity": {
                    "type": "STRING",
                    "enum": severities,
                    "description": "'Critical' for major issues, 'Moderate' for important improvements, or 'Good' for minor tweaks/best practices.",
                },
            },
            "required": ["category", "suggestion", "rationale", "severity"],
            "propertyOrdering": ["category", "suggestion", "rationale", "severity"],
        },
    })
}
