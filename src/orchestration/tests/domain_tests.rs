//! Unit tests for orchestration domain types and adapters.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use crate::capability::domain::{AgentName, InvocationHandle};
use crate::ledger::domain::SessionId;
use crate::orchestration::{
    adapters::{ScriptedAgents, TransportDispatcher},
    domain::{
        AgentRequest, AgentResult, InvocationError, TurnProgress, TurnState, UNAVAILABLE_NOTICE,
        aggregate,
    },
    ports::Invocable,
};
use crate::routing::domain::RoutingContext;

fn name(raw: &str) -> AgentName {
    AgentName::new(raw).expect("valid agent name")
}

fn request() -> AgentRequest {
    AgentRequest::new(SessionId::new(), "show my tickets", &RoutingContext::new())
}

#[rstest]
fn single_reply_is_returned_verbatim() {
    let results = [AgentResult::answered(
        name("TicketsAgent"),
        "You have 2 open tickets.",
        Duration::from_millis(5),
    )];

    assert_eq!(aggregate(&results), "You have 2 open tickets.");
}

#[rstest]
fn several_replies_become_labelled_sections_in_order() {
    let results = [
        AgentResult::answered(name("TicketsAgent"), "Tickets reply", Duration::ZERO),
        AgentResult::failed(
            name("OxygenAgent"),
            InvocationError::Failed("boom".to_owned()),
            Duration::ZERO,
        ),
    ];

    assert_eq!(
        aggregate(&results),
        format!("## TicketsAgent\n\nTickets reply\n\n## OxygenAgent\n\n{UNAVAILABLE_NOTICE}")
    );
}

#[rstest]
fn lone_failure_renders_unavailable_notice() {
    let results = [AgentResult::failed(
        name("TicketsAgent"),
        InvocationError::Timeout(Duration::from_secs(2)),
        Duration::from_secs(2),
    )];

    assert_eq!(aggregate(&results), UNAVAILABLE_NOTICE);
    assert_eq!(
        results.first().map(AgentResult::ledger_text).as_deref(),
        Some("agent timed out after 2000ms")
    );
}

#[rstest]
fn turn_progress_follows_the_happy_path() {
    let mut progress = TurnProgress::new();
    for next in [
        TurnState::Routing,
        TurnState::Invoking,
        TurnState::Aggregating,
        TurnState::Persisting,
        TurnState::Responded,
    ] {
        assert!(progress.advance(next), "{next} should be reachable");
    }

    assert!(progress.current().is_terminal());
    assert_eq!(progress.into_states().len(), 6);
}

#[rstest]
#[case(TurnState::Received, TurnState::Invoking)]
#[case(TurnState::Routing, TurnState::Aggregating)]
#[case(TurnState::NoMatch, TurnState::Responded)]
#[case(TurnState::Responded, TurnState::Routing)]
fn illegal_transitions_are_refused(#[case] from: TurnState, #[case] to: TurnState) {
    assert!(!from.can_advance_to(to));
}

#[rstest]
fn faults_may_end_any_open_state() {
    let mut progress = TurnProgress::new();
    assert!(progress.advance(TurnState::Routing));
    assert!(progress.advance(TurnState::Responded));
    assert!(!progress.advance(TurnState::Invoking));
    assert_eq!(progress.current(), TurnState::Responded);
}

#[rstest]
#[tokio::test]
async fn dispatcher_routes_by_transport() {
    let agents = ScriptedAgents::new().replying("tickets", "pong");
    let dispatcher = TransportDispatcher::new().with_transport(" Local ", Arc::new(agents.clone()));
    let handle = InvocationHandle::new("local", "tickets").expect("valid handle");

    let reply = dispatcher.invoke(&handle, &request()).await;

    assert_eq!(reply.as_deref(), Ok("pong"));
    assert_eq!(agents.called_targets(), vec!["tickets".to_owned()]);
    assert_eq!(dispatcher.transports(), vec!["local"]);
}

#[rstest]
#[tokio::test]
async fn dispatcher_rejects_unknown_transport() {
    let dispatcher = TransportDispatcher::new();
    let handle = InvocationHandle::new("grpc", "tickets").expect("valid handle");

    let reply = dispatcher.invoke(&handle, &request()).await;

    assert_eq!(
        reply,
        Err(InvocationError::UnsupportedTransport("grpc".to_owned()))
    );
}

#[rstest]
#[tokio::test]
async fn unscripted_target_fails() {
    let agents = ScriptedAgents::new();
    let handle = InvocationHandle::new("local", "ghost").expect("valid handle");

    let reply = agents.invoke(&handle, &request()).await;

    assert!(matches!(reply, Err(InvocationError::Failed(_))));
    assert_eq!(agents.call_count(), 1);
}
