use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::error::{AnalysisError, CancelReason};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(msg) => AppError::Validation(msg),
            other => AppError::Analysis(other),
        }
    }
}

/// Malformed request bodies get the same 400 envelope as failed input checks.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e.body_text()),
            JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing Content-Type: application/json header".to_string()
            }
            other => format!("Failed to parse JSON: {}", other.body_text()),
        };
        AppError::Validation(message)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) | AppError::Analysis(AnalysisError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Analysis(err @ AnalysisError::Cancelled(CancelReason::Timeout)) => {
                (StatusCode::GATEWAY_TIMEOUT, "ANALYSIS_TIMEOUT", err.to_string())
            }
            AppError::Analysis(err @ AnalysisError::Cancelled(CancelReason::Caller)) => {
                (StatusCode::CONFLICT, "ANALYSIS_CANCELLED", err.to_string())
            }
            AppError::Analysis(err @ AnalysisError::Transport { .. }) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
            }
            AppError::Analysis(err @ AnalysisError::Http(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE", err.to_string())
            }
            AppError::Analysis(err @ AnalysisError::Parse(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_PARSE_ERROR", err.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
