//! Axum route handlers for the CV analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::lifecycle::{LifecycleSnapshot, RequestId};
use crate::analysis::request::AnalysisRequest;
use crate::errors::AppError;
use crate::models::AnalysisResponse;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCvRequest {
    pub cv_text: String,
    #[serde(default)]
    pub additional_skills: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub cancelled: Option<RequestId>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/analyze
///
/// Validates the submission, runs one analysis and returns the rewritten CV
/// with its market insight. The run is detached from the HTTP connection so
/// the lifecycle settles even if the client goes away.
pub async fn handle_analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeCvRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let Json(body) = body?;
    let request = AnalysisRequest::new(body.cv_text, body.additional_skills)?;

    let session = state.session.clone();
    let response = tokio::spawn(async move { session.run(request, None).await })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Analysis task failed: {e}")))??;

    Ok(Json(response))
}

/// GET /api/v1/cv/analysis
///
/// Current lifecycle state for the presentation layer to render.
pub async fn handle_get_analysis(State(state): State<AppState>) -> Json<LifecycleSnapshot> {
    Json(state.session.snapshot())
}

/// POST /api/v1/cv/analysis/cancel
pub async fn handle_cancel_analysis(
    State(state): State<AppState>,
) -> (StatusCode, Json<CancelResponse>) {
    let cancelled = state.session.cancel();
    (StatusCode::ACCEPTED, Json(CancelResponse { cancelled }))
}

/// DELETE /api/v1/cv/analysis
pub async fn handle_reset_analysis(State(state): State<AppState>) -> StatusCode {
    state.session.reset();
    StatusCode::NO_CONTENT
}
