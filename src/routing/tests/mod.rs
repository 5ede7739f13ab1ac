//! Unit tests for two-stage routing.


use crate::capability::{
    defaults::default_descriptors,
    domain::{AgentDescriptor, AgentName, CapabilityProfile, InvocationHandle, RegistrySnapshot},
};
use mockable::DefaultClock;

fn agent(name: &str, profile: CapabilityProfile) -> AgentDescriptor {
    AgentDescriptor::new(
        AgentName::new(name).expect("valid name"),
        format!("{name} handles its domain"),
        profile,
        InvocationHandle::new("local", name).expect("valid handle"),
        &DefaultClock,
    )
    .expect("valid descriptor")
}

fn snapshot_of(agents: Vec<AgentDescriptor>) -> RegistrySnapshot {
    RegistrySnapshot::from_descriptors(agents, &DefaultClock)
}

fn builtin_snapshot() -> RegistrySnapshot {
    snapshot_of(default_descriptors(&DefaultClock))
}

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
