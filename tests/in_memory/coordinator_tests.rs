//! End-to-end turns over the in-memory stack.

use std::sync::Arc;

use concierge::orchestration::domain::{TurnOutcome, TurnRequest};
use concierge::routing::adapters::ScriptedArbiter;
use rstest::rstest;

use super::helpers::{domain_agent, stack};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn agents_on_different_transports_answer_one_turn() {
    let stack = stack(ScriptedArbiter::selecting([1, 0])).await;

    let response = stack
        .coordinator
        .handle_turn(TurnRequest::new("alice", "show my tickets and courses"))
        .await;

    assert_eq!(response.outcome(), TurnOutcome::Answered);
    assert_eq!(
        response.body(),
        "## TicketsAgent\n\nTicket #42 is open.\n\n## OxygenAgent\n\nRust 101 is 80% done."
    );
    assert_eq!(stack.local_agents.call_count(), 1);
    assert_eq!(stack.http_agents.call_count(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn degraded_arbitration_still_answers_with_top_candidate() {
    let stack = stack(ScriptedArbiter::failing("model offline")).await;

    let response = stack
        .coordinator
        .handle_turn(TurnRequest::new("alice", "show my tickets and courses"))
        .await;

    assert_eq!(response.outcome(), TurnOutcome::Answered);
    assert_eq!(response.body(), "Ticket #42 is open.");
    assert!(response.arbitration().is_some_and(|trace| trace.is_degraded()));
    assert_eq!(stack.http_agents.call_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn newly_registered_agent_is_routed_on_the_next_turn() {
    let stack = stack(ScriptedArbiter::selecting([0])).await;
    let before = stack
        .coordinator
        .handle_turn(TurnRequest::new("alice", "what is my budget"))
        .await;
    assert_eq!(before.outcome(), TurnOutcome::NoCapableAgent);

    stack
        .registry
        .register(domain_agent("BudgetAgent", "local", &["budget"]))
        .await
        .expect("registers");
    let after = stack
        .coordinator
        .handle_turn(TurnRequest::new("alice", "what is my budget"))
        .await;

    assert_eq!(after.outcome(), TurnOutcome::Answered);
    assert_eq!(
        after.results().first().map(|result| result.agent().as_str()),
        Some("BudgetAgent")
    );
    assert!(after.results().first().is_some_and(|result| !result.is_success()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_turns_each_get_their_own_session() {
    let stack = Arc::new(stack(ScriptedArbiter::selecting([0, 1])).await);

    let mut handles = Vec::new();
    for user in 0..8 {
        let shared = Arc::clone(&stack);
        handles.push(tokio::spawn(async move {
            shared
                .coordinator
                .handle_turn(TurnRequest::new(format!("user-{user}"), "show my tickets"))
                .await
        }));
    }

    let mut sessions = Vec::new();
    for handle in handles {
        let response = handle.await.expect("turn task joins");
        assert_eq!(response.outcome(), TurnOutcome::Answered);
        assert!(response.persisted());
        sessions.push(response.session_id().expect("session resolved"));
    }
    sessions.sort_by_key(|id| id.into_inner());
    sessions.dedup();
    assert_eq!(sessions.len(), 8);
    assert_eq!(stack.local_agents.call_count(), 8);
    assert_eq!(stack.arbiter.calls(), 0);
    for id in sessions {
        assert_eq!(stack.ledger.invocations(id).await.expect("trail").len(), 1);
    }
}
