//! Per-turn orchestration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tokio::task::{Id, JoinSet};
use tracing::{debug, info, instrument, warn};

use crate::capability::{
    domain::{AgentName, InvocationHandle},
    ports::SnapshotStore,
    services::CapabilityRegistry,
};
use crate::ledger::{
    domain::{Role, Session, SessionId},
    ports::LedgerStore,
    services::{LedgerError, LedgerResult, RecordInvocationRequest, SessionLedger},
};
use crate::orchestration::{
    domain::{
        AgentRequest, AgentResult, InvocationError, NO_CAPABLE_AGENT_MESSAGE,
        TURN_FAILED_MESSAGE, TurnOutcome, TurnProgress, TurnRequest, TurnResponse,
        TurnResponseParts, TurnState, aggregate,
    },
    ports::Invocable,
};
use crate::routing::{
    domain::{RoutingContext, ScoredCandidate},
    ports::Arbiter,
    services::{Router, RoutingDecision},
};

/// Agent invocation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationConfig {
    /// Per-agent call timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl InvocationConfig {
    /// Returns the per-agent timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

/// Handles user turns end to end.
pub struct OrchestrationCoordinator<S, A, L, I, C>
where
    S: SnapshotStore,
    A: Arbiter,
    L: LedgerStore,
    I: Invocable,
    C: Clock + Send + Sync,
{
    registry: Arc<CapabilityRegistry<S, C>>,
    router: Router<A>,
    ledger: Arc<SessionLedger<L, C>>,
    invoker: Arc<I>,
    config: InvocationConfig,
}

impl<S, A, L, I, C> OrchestrationCoordinator<S, A, L, I, C>
where
    S: SnapshotStore,
    A: Arbiter,
    L: LedgerStore + 'static,
    I: Invocable + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a coordinator over shared services.
    #[must_use]
    pub const fn new(
        registry: Arc<CapabilityRegistry<S, C>>,
        router: Router<A>,
        ledger: Arc<SessionLedger<L, C>>,
        invoker: Arc<I>,
        config: InvocationConfig,
    ) -> Self {
        Self {
            registry,
            router,
            ledger,
            invoker,
            config,
        }
    }

    /// Handles one turn.
    ///
    /// Never fails: faults become a [`TurnOutcome::Failed`] response with an
    /// error-shaped body, and agent or ledger failures degrade the turn.
    #[instrument(skip_all, fields(user_id = %request.user_id()))]
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        let mut progress = TurnProgress::new();
        let (session_id, context) = match self.resolve_session(&request).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, "could not resolve session");
                return failed_turn(progress, None);
            }
        };

        progress.advance(TurnState::Routing);
        let snapshot = self.registry.snapshot();
        let decision = self
            .router
            .route(&snapshot, request.query(), &context)
            .await;
        if matches!(decision, RoutingDecision::NoMatch) {
            progress.advance(TurnState::NoMatch);
            info!(%session_id, "no capable agent");
            return TurnResponse::new(TurnResponseParts {
                session_id: Some(session_id),
                outcome: TurnOutcome::NoCapableAgent,
                body: NO_CAPABLE_AGENT_MESSAGE.to_owned(),
                results: Vec::new(),
                arbitration: None,
                persisted: false,
                states: progress.into_states(),
            });
        }

        progress.advance(TurnState::Invoking);
        let agent_request = AgentRequest::new(session_id, request.query(), &context);
        let results = self.fan_out(&agent_request, decision.selected()).await;

        progress.advance(TurnState::Aggregating);
        let body = aggregate(&results);

        progress.advance(TurnState::Persisting);
        let persisted = self
            .persist(session_id, request.query(), &results, &body)
            .await;

        progress.advance(TurnState::Responded);
        info!(
            %session_id,
            agents = results.len(),
            failed = results.iter().filter(|result| !result.is_success()).count(),
            persisted,
            "turn answered"
        );
        TurnResponse::new(TurnResponseParts {
            session_id: Some(session_id),
            outcome: TurnOutcome::Answered,
            body,
            results,
            arbitration: decision.arbitration().cloned(),
            persisted,
            states: progress.into_states(),
        })
    }

    async fn resolve_session(
        &self,
        request: &TurnRequest,
    ) -> LedgerResult<(SessionId, RoutingContext)> {
        if let Some(id) = request.session_id() {
            if let Some(session) = self.ledger.get_session(id).await? {
                return Ok((id, context_for(&session)));
            }
            info!(session_id = %id, "unknown session, starting a fresh one");
        }
        let id = self.ledger.create_session(request.user_id()).await?;
        Ok((id, RoutingContext::new()))
    }

    /// Calls every selected agent concurrently and returns their results in
    /// selection order.
    async fn fan_out(
        &self,
        request: &AgentRequest,
        selected: &[ScoredCandidate],
    ) -> Vec<AgentResult> {
        let timeout = self.config.timeout();
        let mut tasks = JoinSet::new();
        let mut slots: HashMap<Id, (usize, AgentName)> = HashMap::new();

        for (index, candidate) in selected.iter().enumerate() {
            let invoker = Arc::clone(&self.invoker);
            let agent = candidate.name().clone();
            let handle = candidate.descriptor().handle().clone();
            let agent_request = request.clone();
            let task_agent = agent.clone();
            let abort = tasks.spawn(async move {
                invoke_one(&*invoker, task_agent, &handle, &agent_request, timeout).await
            });
            slots.insert(abort.id(), (index, agent));
        }

        let mut results: Vec<Option<AgentResult>> = vec![None; selected.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok(done) => done,
                Err(err) => {
                    let Some((_, agent)) = slots.get(&err.id()) else {
                        continue;
                    };
                    warn!(%agent, error = %err, "agent task aborted");
                    let failure = AgentResult::failed(
                        agent.clone(),
                        InvocationError::Aborted(err.to_string()),
                        Duration::ZERO,
                    );
                    (err.id(), failure)
                }
            };
            if let Some(slot) = slots
                .get(&id)
                .and_then(|(index, _)| results.get_mut(*index))
            {
                *slot = Some(result);
            }
        }
        results.into_iter().flatten().collect()
    }

    /// Writes the turn to the ledger from a detached task so a started
    /// write completes even if the caller is cancelled.
    async fn persist(
        &self,
        session_id: SessionId,
        query: &str,
        results: &[AgentResult],
        body: &str,
    ) -> bool {
        let ledger = Arc::clone(&self.ledger);
        let invocations: Vec<RecordInvocationRequest> = results
            .iter()
            .map(|result| RecordInvocationRequest {
                session_id,
                agent_name: result.agent().clone(),
                query: query.to_owned(),
                response: result.ledger_text(),
                success: result.is_success(),
                duration: result.duration(),
            })
            .collect();
        let user_message = query.to_owned();
        let assistant_message = body.to_owned();

        let write = tokio::spawn(async move {
            record_turn(&ledger, session_id, invocations, user_message, assistant_message).await
        });
        match write.await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(%session_id, error = %err, "turn not persisted");
                false
            }
            Err(err) => {
                warn!(%session_id, error = %err, "ledger task aborted");
                false
            }
        }
    }
}

async fn invoke_one<I>(
    invoker: &I,
    agent: AgentName,
    handle: &InvocationHandle,
    request: &AgentRequest,
    timeout: Duration,
) -> AgentResult
where
    I: Invocable + ?Sized,
{
    let started = tokio::time::Instant::now();
    let outcome = tokio::time::timeout(timeout, invoker.invoke(handle, request)).await;
    let elapsed = started.elapsed();
    match outcome {
        Ok(Ok(reply)) => {
            debug!(%agent, ?elapsed, "agent answered");
            AgentResult::answered(agent, reply, elapsed)
        }
        Ok(Err(err)) => {
            warn!(%agent, error = %err, "agent call failed");
            AgentResult::failed(agent, err, elapsed)
        }
        Err(_) => {
            warn!(%agent, ?timeout, "agent call timed out");
            AgentResult::failed(agent, InvocationError::Timeout(timeout), elapsed)
        }
    }
}

async fn record_turn<L, C>(
    ledger: &SessionLedger<L, C>,
    session_id: SessionId,
    invocations: Vec<RecordInvocationRequest>,
    user_message: String,
    assistant_message: String,
) -> Result<(), LedgerError>
where
    L: LedgerStore,
    C: Clock + Send + Sync,
{
    for invocation in invocations {
        ledger.record_invocation(invocation).await?;
    }
    ledger
        .append_history(session_id, Role::User, user_message)
        .await?;
    ledger
        .append_history(session_id, Role::Assistant, assistant_message)
        .await?;
    Ok(())
}

fn context_for(session: &Session) -> RoutingContext {
    let mut context = RoutingContext::new();
    if let Some(agent) = session.last_agent_called() {
        context = context.with_last_agent(agent.clone());
    }
    if let Some(query) = session.last_query() {
        context = context.with_last_query(query);
    }
    context
}

fn failed_turn(mut progress: TurnProgress, session_id: Option<SessionId>) -> TurnResponse {
    progress.advance(TurnState::Responded);
    TurnResponse::new(TurnResponseParts {
        session_id,
        outcome: TurnOutcome::Failed,
        body: TURN_FAILED_MESSAGE.to_owned(),
        results: Vec::new(),
        arbitration: None,
        persisted: false,
        states: progress.into_states(),
    })
}
