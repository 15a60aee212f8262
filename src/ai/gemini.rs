//! Google Gemini `generateContent` client.
//!
//! Translates a [`CompletionRequest`] into the REST wire format and pulls the
//! reply text out of the first candidate. The API key is checked on every
//! call rather than at construction, so a dashboard without a key still
//! starts and only the AI actions fail.

use super::{CompletionRequest, CompletionService, Part};
use crate::config::{Config, API_KEY_ENV};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("dbsmart/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl CompletionService for GeminiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(Error::ConfigMissing(API_KEY_ENV))?;

        let body = GenerateContentRequest::from(request);
        tracing::debug!(model = %self.model, operation = %request.operation, "POST generateContent");

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(Error::Service(format!("HTTP {}: {}", status, detail.trim())));
        }

        let reply: GenerateContentResponse = response.json()?;
        reply.text()
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text { text: &'a str },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> From<&'a CompletionRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart::Text { text },
                Part::InlineData { mime_type, data } => WirePart::Inline {
                    inline_data: InlineData { mime_type, data },
                },
            })
            .collect();

        Self {
            contents: vec![Content { parts }],
            generation_config: request.response_schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(self) -> Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Service("response contained no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Service("response contained no text".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{prompt, Operation};
    use crate::model::{InputArtifact, UploadedFile};
    use serde_json::json;

    fn config(api_key: Option<&str>) -> Config {
        Config {
            api_key: api_key.map(str::to_string),
            model: "gemini-2.5-flash".to_string(),
            endpoint: "http://127.0.0.1:9/".to_string(),
        }
    }

    #[test]
    fn test_missing_key_fails_before_network() {
        let client = GeminiClient::new(&config(None)).unwrap();
        let request = prompt::er_request("CREATE TABLE t (x INT);").unwrap();

        let err = client.complete(&request).unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(API_KEY_ENV)));
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let client = GeminiClient::new(&config(Some(""))).unwrap();
        let request = prompt::er_request("CREATE TABLE t (x INT);").unwrap();
        assert!(matches!(client.complete(&request), Err(Error::ConfigMissing(_))));
    }

    #[test]
    fn test_url_uses_model_and_trims_endpoint() {
        let client = GeminiClient::new(&config(Some("k"))).unwrap();
        assert_eq!(
            client.url(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_text_request_wire_format() {
        let request = CompletionRequest {
            operation: Operation::GenerateEr,
            parts: vec![Part::Text("hello".to_string())],
            response_schema: None,
        };
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(body, json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
    }

    #[test]
    fn test_image_request_wire_format() {
        let input = InputArtifact::File(UploadedFile {
            name: "er.png".to_string(),
            mime_type: "image/png".to_string(),
            content: "iVBORw==".to_string(),
        });
        let request = prompt::sql_request(Some(&input)).unwrap();
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], json!({ "inlineData": { "mimeType": "image/png", "data": "iVBORw==" } }));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_optimize_request_sets_generation_config() {
        let request = prompt::optimize_request("CREATE TABLE t (x INT);").unwrap();
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "CREATE " }, { "text": "TABLE t;" }] } }]
        }))
        .unwrap();
        assert_eq!(reply.text().unwrap(), "CREATE TABLE t;");
    }

    #[test]
    fn test_response_without_candidates_is_error() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(reply.text(), Err(Error::Service(_))));

        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(matches!(blocked.text(), Err(Error::Service(_))));
    }
}
