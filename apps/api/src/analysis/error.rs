use std::fmt;

use thiserror::Error;

/// Which cancellation source aborted a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The transport's internal deadline elapsed.
    Timeout,
    /// The caller's token fired (explicit cancel, reset, or a superseding run).
    Caller,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Timeout => write!(f, "timed out"),
            CancelReason::Caller => write!(f, "cancelled by caller"),
        }
    }
}

/// Every way an analysis can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis cancelled: {0}")]
    Cancelled(CancelReason),

    #[error("Analysis engine returned {status} {status_text}")]
    Transport { status: u16, status_text: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Parse(String),
}

impl AnalysisError {
    /// Stable tag for callers that need to tell failures apart.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "validation",
            AnalysisError::Cancelled(_) => "cancelled",
            AnalysisError::Transport { .. } => "transport",
            AnalysisError::Http(_) => "network",
            AnalysisError::Parse(_) => "parse",
        }
    }
}
