//! Arbiter returning canned replies, for tests and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::routing::{
    domain::{ArbitrationRequest, ArbitrationVerdict},
    ports::{Arbiter, ArbiterError, ArbiterResult},
};

/// A canned arbiter reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Return this verdict.
    Verdict(ArbitrationVerdict),
    /// Fail with [`ArbiterError::Unavailable`].
    Fail(String),
}

/// Arbiter that replays queued replies, then repeats a default.
///
/// Counts calls and keeps every request so tests can assert whether stage
/// 2 ran and what it was shown.
#[derive(Debug)]
pub struct ScriptedArbiter {
    default_reply: ScriptedReply,
    queued: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ArbitrationRequest>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedArbiter {
    /// Creates an arbiter that always returns `reply`.
    #[must_use]
    pub fn new(reply: ScriptedReply) -> Self {
        Self {
            default_reply: reply,
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates an arbiter that always selects `indices`.
    #[must_use]
    pub fn selecting(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::new(ScriptedReply::Verdict(ArbitrationVerdict::selecting(indices)))
    }

    /// Creates an arbiter that always fails.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(ScriptedReply::Fail(reason.into()))
    }

    /// Delays every reply, to exercise the arbitration timeout.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues a one-off reply ahead of the default.
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.queued.lock().push_back(reply);
    }

    /// Returns how many times the arbiter was called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ArbitrationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Arbiter for ScriptedArbiter {
    async fn arbitrate(&self, request: &ArbitrationRequest) -> ArbiterResult<ArbitrationVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        let reply = self
            .queued
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            ScriptedReply::Verdict(verdict) => Ok(verdict),
            ScriptedReply::Fail(reason) => Err(ArbiterError::Unavailable(reason)),
        }
    }
}
