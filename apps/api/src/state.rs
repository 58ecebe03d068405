use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analysis::session::AnalysisSession;
use crate::analysis::transport::AnalysisTransport;
use crate::config::{Config, EngineKind};
use crate::engine_client::{AnalysisEngine, BackendEngine, GeminiEngine};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single analysis session: one lifecycle, at most one run in flight.
    pub session: Arc<AnalysisSession>,
}

impl AppState {
    pub fn new(session: AnalysisSession) -> Self {
        Self {
            session: Arc::new(session),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = build_engine(config)?;
        let session = AnalysisSession::new(AnalysisTransport::new(engine));
        Ok(Self::new(session))
    }
}

/// Picks the engine backend named by `ANALYSIS_ENGINE`.
pub fn build_engine(config: &Config) -> Result<Arc<dyn AnalysisEngine>> {
    let engine: Arc<dyn AnalysisEngine> = match config.engine {
        EngineKind::Backend => Arc::new(
            BackendEngine::new(config.analysis_api_url.clone())
                .context("Failed to build analysis backend client")?,
        ),
        EngineKind::Gemini => {
            let api_key = config
                .gemini_api_key
                .clone()
                .context("GEMINI_API_KEY is required for the gemini engine")?;
            Arc::new(
                GeminiEngine::new(
                    config.gemini_api_url.clone(),
                    config.gemini_model.clone(),
                    api_key,
                )
                .context("Failed to build Gemini client")?,
            )
        }
    };
    Ok(engine)
}
