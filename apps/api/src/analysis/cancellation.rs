//! Cancellation plumbing for engine calls.
//!
//! `AnyCancellation` fires as soon as any of its tagged tokens fires and
//! reports which one did. `DeadlineToken` is a token backed by a timer task;
//! dropping it aborts the task so no timer outlives the call it guards.

use std::time::Duration;

use futures::future::{self, FutureExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::analysis::error::CancelReason;

/// Logical OR over several cancellation tokens.
#[derive(Debug, Default, Clone)]
pub struct AnyCancellation {
    sources: Vec<(CancellationToken, CancelReason)>,
}

impl AnyCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: CancellationToken, reason: CancelReason) -> Self {
        self.sources.push((token, reason));
        self
    }

    /// First source (in insertion order) that has already fired.
    pub fn fired(&self) -> Option<CancelReason> {
        self.sources
            .iter()
            .find(|(token, _)| token.is_cancelled())
            .map(|(_, reason)| *reason)
    }

    /// Resolves with the reason of the first source to fire.
    /// Never resolves when there are no sources.
    pub async fn cancelled(&self) -> CancelReason {
        if let Some(reason) = self.fired() {
            return reason;
        }
        if self.sources.is_empty() {
            return future::pending().await;
        }

        let waiters = self.sources.iter().map(|(token, reason)| {
            let reason = *reason;
            token.cancelled().map(move |()| reason).boxed()
        });
        let (reason, _, _) = future::select_all(waiters).await;
        reason
    }
}

/// A cancellation token that fires once `after` has elapsed.
#[derive(Debug)]
pub struct DeadlineToken {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl DeadlineToken {
    pub fn start(after: Duration) -> Self {
        let token = CancellationToken::new();
        let fire = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            fire.cancel();
        });
        Self { token, timer }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for DeadlineToken {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
