//! Analysis session: owns the one `RequestLifecycle` and drives it around
//! pipeline runs.
//!
//! Starting a run cancels the token of the run it supersedes, so at most one
//! engine call is meaningfully in flight. The lifecycle's id fencing makes the
//! superseded run's late settle a no-op.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analysis::error::AnalysisError;
use crate::analysis::lifecycle::{LifecycleSnapshot, RequestId, RequestLifecycle};
use crate::analysis::pipeline::analyze;
use crate::analysis::request::AnalysisRequest;
use crate::analysis::transport::AnalysisTransport;
use crate::models::AnalysisResponse;

struct SessionInner {
    lifecycle: RequestLifecycle,
    in_flight: Option<(RequestId, CancellationToken)>,
}

pub struct AnalysisSession {
    transport: AnalysisTransport,
    inner: Mutex<SessionInner>,
}

impl AnalysisSession {
    pub fn new(transport: AnalysisTransport) -> Self {
        Self {
            transport,
            inner: Mutex::new(SessionInner {
                lifecycle: RequestLifecycle::new(),
                in_flight: None,
            }),
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.transport.engine_name()
    }

    /// Runs one analysis and records its outcome in the lifecycle.
    ///
    /// `cancel` is an optional caller token; the run also stops when it is
    /// superseded, cancelled through [`cancel`](Self::cancel) or reset.
    pub async fn run(
        &self,
        request: AnalysisRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let token = match cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        let id = {
            let mut inner = self.inner.lock();
            if let Some((previous, previous_token)) = inner.in_flight.take() {
                info!("Request {} superseded; cancelling it", previous.get());
                previous_token.cancel();
            }
            let id = inner.lifecycle.begin();
            inner.in_flight = Some((id, token.clone()));
            id
        };

        info!(
            "Analysis request {} started (engine: {}, cv: {} chars)",
            id.get(),
            self.transport.engine_name(),
            request.cv_text().chars().count()
        );

        let outcome = analyze(&self.transport, &request, Some(&token)).await;

        {
            let mut inner = self.inner.lock();
            if matches!(&inner.in_flight, Some((active, _)) if *active == id) {
                inner.in_flight = None;
            }
            match &outcome {
                Ok(response) => {
                    if inner.lifecycle.resolve(id, response.clone()) {
                        info!("Analysis request {} succeeded", id.get());
                    }
                }
                Err(err) => {
                    warn!("Analysis request {} failed ({}): {err}", id.get(), err.kind());
                    inner.lifecycle.fail(id, err.to_string());
                }
            }
        }

        outcome
    }

    /// Cancels the in-flight run, if any. Its failure lands in the lifecycle
    /// as a cancelled error.
    pub fn cancel(&self) -> Option<RequestId> {
        let inner = self.inner.lock();
        let (id, token) = inner.in_flight.as_ref()?;
        info!("Cancelling analysis request {}", id.get());
        token.cancel();
        Some(*id)
    }

    /// Cancels any in-flight run and returns the lifecycle to idle.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        if let Some((id, token)) = inner.in_flight.take() {
            info!("Reset discards analysis request {}", id.get());
            token.cancel();
        }
        inner.lifecycle.reset();
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        self.inner.lock().lifecycle.snapshot()
    }
}
