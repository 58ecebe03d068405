//! HTTP backend engine: posts the analysis payload to `{base}/cv/analyze`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::analysis::error::AnalysisError;
use crate::analysis::request::AnalysisPayload;
use crate::engine_client::{transport_error, AnalysisEngine, RawPayload};

const ANALYZE_ENDPOINT: &str = "/cv/analyze";

#[derive(Clone)]
pub struct BackendEngine {
    client: Client,
    base_url: String,
}

impl BackendEngine {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AnalysisError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, ANALYZE_ENDPOINT)
    }
}

#[async_trait]
impl AnalysisEngine for BackendEngine {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn call(&self, payload: &AnalysisPayload<'_>) -> Result<RawPayload, AnalysisError> {
        let url = self.endpoint();
        debug!("POST {url}");

        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Analysis backend returned {status}");
            return Err(transport_error(status));
        }

        let body = response.text().await?;
        Ok(RawPayload::from_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> AnalysisPayload<'static> {
        AnalysisPayload {
            cv_text: "cv text",
            additional_skills: "SQL",
            prompt: "the prompt",
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let engine = BackendEngine::new("http://localhost:3001/api/").unwrap();
        assert_eq!(engine.endpoint(), "http://localhost:3001/api/cv/analyze");
    }

    #[tokio::test]
    async fn test_posts_json_payload_and_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cv/analyze"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "cvText": "cv text",
                "additionalSkills": "SQL",
                "prompt": "the prompt"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let engine = BackendEngine::new(format!("{}/api", server.uri())).unwrap();
        let raw = engine.call(&payload()).await.unwrap();

        assert_eq!(raw.body, "{\"ok\":true}");
        assert!(raw.grounding_chunks.is_none());
    }

    #[tokio::test]
    async fn test_body_is_returned_even_when_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let engine = BackendEngine::new(server.uri()).unwrap();
        let raw = engine.call(&payload()).await.unwrap();
        assert_eq!(raw.body, "not json");
    }

    #[tokio::test]
    async fn test_server_error_maps_to_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let engine = BackendEngine::new(server.uri()).unwrap();
        let err = engine.call(&payload()).await.unwrap_err();

        match err {
            AnalysisError::Transport {
                status,
                status_text,
            } => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) is not listening in test environments.
        let engine = BackendEngine::new("http://127.0.0.1:9").unwrap();
        let err = engine.call(&payload()).await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
