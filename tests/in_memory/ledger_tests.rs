//! Session ledger behaviour across many sessions.

use std::sync::Arc;
use std::time::Duration;

use concierge::capability::domain::AgentName;
use concierge::ledger::{
    adapters::InMemoryLedgerStore,
    domain::Role,
    services::{LedgerConfig, RecordInvocationRequest, SessionLedger},
};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sessions_progress_independently() {
    let ledger = Arc::new(SessionLedger::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(DefaultClock),
        LedgerConfig::default(),
    ));

    let mut handles = Vec::new();
    for user in 0..6 {
        let shared = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            let id = shared.create_session(&format!("user-{user}")).await?;
            for turn in 0..3 {
                shared
                    .record_invocation(RecordInvocationRequest {
                        session_id: id,
                        agent_name: AgentName::new("TicketsAgent").expect("valid name"),
                        query: format!("turn {turn}"),
                        response: "ok".to_owned(),
                        success: true,
                        duration: Duration::from_millis(1),
                    })
                    .await?;
                shared
                    .append_history(id, Role::User, format!("turn {turn}"))
                    .await?;
            }
            Ok::<_, concierge::ledger::services::LedgerError>(id)
        }));
    }

    for handle in handles {
        let id = handle.await.expect("task joins").expect("session writes succeed");
        assert_eq!(ledger.invocations(id).await.expect("trail").len(), 3);
        let history = ledger.get_history(id, 10).await.expect("history");
        let contents: Vec<&str> = history.iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["turn 0", "turn 1", "turn 2"]);
        let session = ledger.get_session(id).await.expect("lookup").expect("exists");
        assert_eq!(session.last_query(), Some("turn 2"));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cleanup_with_long_horizon_keeps_everything() {
    let ledger = SessionLedger::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(DefaultClock),
        LedgerConfig::default(),
    );
    let id = ledger.create_session("alice").await.expect("session");

    let removed = ledger
        .cleanup(Duration::from_secs(24 * 60 * 60))
        .await
        .expect("cleanup");

    assert_eq!(removed, 0);
    assert!(ledger.get_session(id).await.expect("lookup").is_some());
}
