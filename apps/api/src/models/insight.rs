use serde::{Deserialize, Serialize};

use crate::models::resume::CvResume;

/// A corroborating web source cited by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Labor-market recommendation attached to a rewritten résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsight {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub estimated_salary: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// The unit of success of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "updatedCV")]
    pub updated_cv: CvResume,
    pub insight: MarketInsight,
}
