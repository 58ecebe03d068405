//! Structural decoding of the engine's JSON answer.

use crate::analysis::error::AnalysisError;
use crate::models::AnalysisResponse;

/// Wraps a serde diagnostic as `AnalysisError::Parse`.
pub fn parse_failure(err: serde_json::Error) -> AnalysisError {
    AnalysisError::Parse(format!("Failed to parse response: {err}"))
}

/// Decodes `raw` into an `AnalysisResponse`.
///
/// Only the fields the engine schema marks as required must be present;
/// nothing is defaulted at the top level and no partial result is produced.
pub fn decode(raw: &str) -> Result<AnalysisResponse, AnalysisError> {
    serde_json::from_str(raw).map_err(parse_failure)
}
