//! Registry administration through the public service API.

use concierge::capability::{
    domain::{DescriptorPatch, RegistryFilter},
    services::RegistryServiceError,
};
use concierge::routing::{domain::RoutingContext, services::CapabilityScorer};
use rstest::rstest;

use super::helpers::{domain_agent, empty_registry};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_agent_is_listed_but_never_scored() {
    let registry = empty_registry().await;
    registry
        .register(domain_agent("TicketsAgent", "local", &["tickets"]))
        .await
        .expect("tickets registers");
    registry
        .register(domain_agent("HelpdeskAgent", "local", &["tickets"]))
        .await
        .expect("helpdesk registers");

    registry.disable("HelpdeskAgent").await.expect("disable");
    registry.disable("HelpdeskAgent").await.expect("disable again");

    let enabled = registry.list(&RegistryFilter::all().with_enabled(true));
    assert_eq!(enabled.len(), 1);
    assert_eq!(registry.list(&RegistryFilter::all()).len(), 2);

    let candidates =
        CapabilityScorer::default().score(&registry.snapshot(), "my tickets", &RoutingContext::new());
    let names: Vec<&str> = candidates.iter().map(|c| c.name().as_str()).collect();
    assert_eq!(names, vec!["TicketsAgent"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enable_disable_round_trip_keeps_one_entry() {
    let registry = empty_registry().await;
    registry
        .register(domain_agent("TicketsAgent", "local", &["tickets"]))
        .await
        .expect("registers");
    let before = registry.get("TicketsAgent").expect("valid").expect("present");

    registry.disable("TicketsAgent").await.expect("disable");
    let after = registry.enable("TicketsAgent").await.expect("enable");

    assert_eq!(registry.snapshot().len(), 1);
    assert_eq!(after.name(), before.name());
    assert_eq!(after.registration_order(), before.registration_order());
    assert_eq!(after.profile(), before.profile());
    assert!(after.is_enabled());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_deregister_change_what_is_listed() {
    let registry = empty_registry().await;
    registry
        .register(domain_agent("TicketsAgent", "local", &["tickets"]).with_tags(vec!["ops".to_owned()]))
        .await
        .expect("registers");

    registry
        .update("TicketsAgent", DescriptorPatch::new().with_tags(["support"]))
        .await
        .expect("update");
    assert!(registry.list(&RegistryFilter::all().with_tag("ops")).is_empty());
    assert_eq!(registry.list(&RegistryFilter::all().with_tag("support")).len(), 1);

    registry.deregister("TicketsAgent").await.expect("deregister");
    let again = registry.deregister("TicketsAgent").await;
    assert!(matches!(again, Err(RegistryServiceError::NotFound(_))));
    assert!(registry.snapshot().is_empty());
}
