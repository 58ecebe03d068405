//! Request lifecycle: the single observable state of "the current analysis".
//!
//! `Idle → Pending → Success | Error`, back to `Pending` on the next
//! `begin()` and to `Idle` on `reset()`. Every transition is total.
//!
//! Each `begin()` hands out a fresh `RequestId`. `resolve`/`fail` only apply
//! when they carry the active id; anything else (a superseded run, a run that
//! was reset, or a second settle of the same run) is ignored. This keeps a
//! slow, stale response from overwriting a newer run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::AnalysisResponse;

/// Identifies one `begin()`. Strictly increasing per lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Outcome slot. A result and an error can never be held at the same time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Success(AnalysisResponse),
    Error(String),
}

impl RequestState {
    pub fn status(&self) -> RequestStatus {
        match self {
            RequestState::Idle => RequestStatus::Idle,
            RequestState::Pending => RequestStatus::Pending,
            RequestState::Success(_) => RequestStatus::Success,
            RequestState::Error(_) => RequestStatus::Error,
        }
    }
}

/// Serializable view for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleSnapshot {
    pub request_id: Option<RequestId>,
    pub status: RequestStatus,
    pub result: Option<AnalysisResponse>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RequestLifecycle {
    state: RequestState,
    /// Id of the run allowed to settle, if any.
    active: Option<RequestId>,
    /// Last id handed out by `begin()`.
    last_issued: Option<RequestId>,
    next_id: u64,
    updated_at: DateTime<Utc>,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            active: None,
            last_issued: None,
            next_id: 1,
            updated_at: Utc::now(),
        }
    }

    /// Starts a new run: `Pending`, previous outcome cleared.
    pub fn begin(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.active = Some(id);
        self.last_issued = Some(id);
        self.set(RequestState::Pending);
        id
    }

    /// Stores `response` as the outcome of run `id`. Returns `false` if `id`
    /// is not the active run.
    pub fn resolve(&mut self, id: RequestId, response: AnalysisResponse) -> bool {
        if !self.settle(id) {
            return false;
        }
        self.set(RequestState::Success(response));
        true
    }

    /// Records `message` as the failure of run `id`. Returns `false` if `id`
    /// is not the active run.
    pub fn fail(&mut self, id: RequestId, message: impl Into<String>) -> bool {
        if !self.settle(id) {
            return false;
        }
        self.set(RequestState::Error(message.into()));
        true
    }

    /// Back to `Idle`. Any run still in flight can no longer settle.
    pub fn reset(&mut self) {
        self.active = None;
        self.set(RequestState::Idle);
    }

    pub fn status(&self) -> RequestStatus {
        self.state.status()
    }

    pub fn result(&self) -> Option<&AnalysisResponse> {
        match &self.state {
            RequestState::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            request_id: self.last_issued,
            status: self.status(),
            result: self.result().cloned(),
            error: self.error().map(str::to_string),
            updated_at: self.updated_at,
        }
    }

    fn settle(&mut self, id: RequestId) -> bool {
        if self.active != Some(id) {
            debug!(
                "Ignoring stale settle for request {} (active: {:?})",
                id.get(),
                self.active.map(RequestId::get)
            );
            return false;
        }
        self.active = None;
        true
    }

    fn set(&mut self, state: RequestState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}
