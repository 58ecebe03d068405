//! Engine client: the single point of entry for calls to the analysis engine.
//!
//! Every engine call goes through an `AnalysisEngine`. Implementations make
//! exactly one HTTP request per call and never retry; timeouts and
//! cancellation are layered on top by `analysis::transport`.

use async_trait::async_trait;
use serde_json::Value;

use crate::analysis::error::AnalysisError;
use crate::analysis::request::AnalysisPayload;

pub mod backend;
pub mod gemini;

pub use backend::BackendEngine;
pub use gemini::GeminiEngine;

/// Undecoded engine output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload {
    /// Response body text, not assumed to be valid JSON.
    pub body: String,
    /// Citation metadata, when the engine exposes it. `None` means the engine
    /// has no grounding channel and `body` carries its own sources.
    pub grounding_chunks: Option<Vec<Value>>,
}

impl RawPayload {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            grounding_chunks: None,
        }
    }
}

/// An analysis engine backend. Carried as `Arc<dyn AnalysisEngine>`.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn call(&self, payload: &AnalysisPayload<'_>) -> Result<RawPayload, AnalysisError>;
}

/// Maps a non-success HTTP status to `AnalysisError::Transport`.
pub(crate) fn transport_error(status: reqwest::StatusCode) -> AnalysisError {
    AnalysisError::Transport {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}
