//! Gemini engine: calls `generateContent` directly with Google Search
//! grounding and a JSON response schema.
//!
//! The model's JSON answer is returned as the raw body; the candidate's
//! grounding chunks travel alongside it for source extraction.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::analysis::decoder::parse_failure;
use crate::analysis::error::AnalysisError;
use crate::analysis::request::AnalysisPayload;
use crate::engine_client::{transport_error, AnalysisEngine, RawPayload};

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<Value>,
}

impl GenerateContentResponse {
    /// Text of the first candidate and its grounding chunks.
    fn into_raw(self) -> RawPayload {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return RawPayload {
                body: String::new(),
                grounding_chunks: Some(Vec::new()),
            };
        };

        let body: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let chunks = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default();

        RawPayload {
            body,
            grounding_chunks: Some(chunks),
        }
    }
}

/// Response schema declared to the model. Only the fields listed under
/// `required` are guaranteed by the engine.
pub fn response_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let string_array = json!({ "type": "ARRAY", "items": string });

    json!({
        "type": "OBJECT",
        "properties": {
            "updatedCV": {
                "type": "OBJECT",
                "properties": {
                    "fullName": string,
                    "email": string,
                    "phone": string,
                    "location": string,
                    "summary": string,
                    "experiences": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "company": string,
                                "role": string,
                                "location": string,
                                "period": string,
                                "description": string_array
                            }
                        }
                    },
                    "education": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "school": string,
                                "degree": string,
                                "year": string
                            }
                        }
                    },
                    "skills": string_array,
                    "additionalSkills": string_array
                },
                "required": ["fullName", "email", "experiences", "skills"]
            },
            "insight": {
                "type": "OBJECT",
                "properties": {
                    "jobTitle": string,
                    "estimatedSalary": string,
                    "reasoning": string
                }
            }
        },
        "required": ["updatedCV", "insight"]
    })
}

#[derive(Clone)]
pub struct GeminiEngine {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiEngine {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

#[async_trait]
impl AnalysisEngine for GeminiEngine {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn call(&self, payload: &AnalysisPayload<'_>) -> Result<RawPayload, AnalysisError> {
        let url = self.endpoint();
        debug!("POST {url} (model: {})", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(payload.prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Gemini returned {status}");
            return Err(transport_error(status));
        }

        let text = response.text().await?;
        let envelope: GenerateContentResponse =
            serde_json::from_str(&text).map_err(parse_failure)?;

        Ok(envelope.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::pipeline::{analyze, tests::JEAN_DUPONT};
    use crate::analysis::request::AnalysisRequest;
    use crate::analysis::transport::AnalysisTransport;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> AnalysisPayload<'static> {
        AnalysisPayload {
            cv_text: "cv",
            additional_skills: "",
            prompt: "analyse ce CV",
        }
    }

    #[test]
    fn test_endpoint_includes_model() {
        let engine = GeminiEngine::new(DEFAULT_GEMINI_API_URL, "gemini-x", "key").unwrap();
        assert_eq!(
            engine.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_request_body_declares_schema_and_search_tool() {
        let body = GeminiEngine::request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body["tools"][0].get("google_search").is_some());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["updatedCV", "insight"])
        );
    }

    #[test]
    fn test_into_raw_joins_parts_and_keeps_chunks() {
        let envelope: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                "groundingMetadata": {
                    "groundingChunks": [{ "web": { "title": "Glassdoor", "uri": "https://glassdoor.fr" } }]
                }
            }]
        }))
        .unwrap();

        let raw = envelope.into_raw();
        assert_eq!(raw.body, "{\"a\":1}");
        assert_eq!(raw.grounding_chunks.unwrap().len(), 1);
    }

    #[test]
    fn test_into_raw_without_candidates_is_empty() {
        let envelope: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        let raw = envelope.into_raw();
        assert_eq!(raw.body, "");
        assert_eq!(raw.grounding_chunks, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_call_sends_api_key_and_extracts_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = GeminiEngine::new(server.uri(), "gemini-test", "secret").unwrap();
        let raw = engine.call(&payload()).await.unwrap();

        assert_eq!(raw.body, "{}");
        assert_eq!(raw.grounding_chunks, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_call_maps_status_to_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let engine = GeminiEngine::new(server.uri(), "gemini-test", "secret").unwrap();
        let err = engine.call(&payload()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Transport { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let engine = GeminiEngine::new(server.uri(), "gemini-test", "secret").unwrap();
        let err = engine.call(&payload()).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn test_grounding_chunks_replace_sources_in_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": JEAN_DUPONT }] },
                    "groundingMetadata": {
                        "groundingChunks": [
                            { "web": { "title": "APEC Salaires", "uri": "https://apec.fr/salaires" } },
                            { "web": { "title": "Sans lien" } }
                        ]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = GeminiEngine::new(server.uri(), "gemini-test", "secret").unwrap();
        let transport = AnalysisTransport::new(Arc::new(engine));
        let request = AnalysisRequest::new("A".repeat(60), None).unwrap();

        let response = analyze(&transport, &request, None).await.unwrap();

        assert_eq!(response.updated_cv.full_name, "Jean Dupont");
        assert_eq!(response.insight.sources.len(), 1);
        assert_eq!(response.insight.sources[0].title, "APEC Salaires");
        assert_eq!(response.insight.sources[0].uri, "https://apec.fr/salaires");
    }
}
