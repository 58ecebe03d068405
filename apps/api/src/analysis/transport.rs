//! Bounded engine calls: one attempt, a hard deadline, and optional caller
//! cancellation, whichever settles first.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::analysis::cancellation::{AnyCancellation, DeadlineToken};
use crate::analysis::error::{AnalysisError, CancelReason};
use crate::analysis::request::AnalysisPayload;
use crate::engine_client::{AnalysisEngine, RawPayload};

/// Hard client-side deadline for one analysis call.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_millis(60_000);

#[derive(Clone)]
pub struct AnalysisTransport {
    engine: Arc<dyn AnalysisEngine>,
    timeout: Duration,
}

impl AnalysisTransport {
    pub fn new(engine: Arc<dyn AnalysisEngine>) -> Self {
        Self {
            engine,
            timeout: ANALYSIS_TIMEOUT,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Sends `payload` and returns the raw engine output.
    ///
    /// Fails with `Cancelled(Timeout)` once the deadline passes and with
    /// `Cancelled(Caller)` when `cancel` fires, including when it had already
    /// fired on entry, in which case the engine is never called. Whichever
    /// way this returns, the in-flight request future and the deadline timer
    /// are dropped.
    pub async fn send(
        &self,
        payload: &AnalysisPayload<'_>,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawPayload, AnalysisError> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!("Caller token already cancelled; skipping engine call");
            return Err(AnalysisError::Cancelled(CancelReason::Caller));
        }

        let deadline = DeadlineToken::start(self.timeout);
        let mut signal = AnyCancellation::new().with(deadline.token(), CancelReason::Timeout);
        if let Some(token) = cancel {
            signal = signal.with(token.clone(), CancelReason::Caller);
        }

        tokio::select! {
            biased;
            reason = signal.cancelled() => {
                warn!("Engine call to {} aborted: {reason}", self.engine.name());
                Err(AnalysisError::Cancelled(reason))
            }
            result = self.engine.call(payload) => result,
        }
    }
}
