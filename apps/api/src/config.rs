use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::engine_client::gemini::{DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};

const DEFAULT_ANALYSIS_API_URL: &str = "http://localhost:3001/api";

/// Which analysis engine the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// The CV analysis backend (`POST {ANALYSIS_API_URL}/cv/analyze`).
    Backend,
    /// Gemini `generateContent` with Google Search grounding.
    Gemini,
}

impl FromStr for EngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backend" => Ok(EngineKind::Backend),
            "gemini" => Ok(EngineKind::Gemini),
            other => bail!("Unknown ANALYSIS_ENGINE '{other}' (expected 'backend' or 'gemini')"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub engine: EngineKind,
    pub analysis_api_url: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let engine = lookup("ANALYSIS_ENGINE")
            .map(|v| v.parse::<EngineKind>())
            .transpose()?
            .unwrap_or(EngineKind::Backend);

        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty());
        if engine == EngineKind::Gemini && gemini_api_key.is_none() {
            bail!("Required environment variable 'GEMINI_API_KEY' is not set (ANALYSIS_ENGINE=gemini)");
        }

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            engine,
            analysis_api_url: lookup("ANALYSIS_API_URL")
                .unwrap_or_else(|| DEFAULT_ANALYSIS_API_URL.to_string()),
            gemini_api_url: lookup("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_key,
        })
    }
}
