//! Given steps for routing BDD scenarios.

use std::sync::Arc;

use concierge::routing::adapters::ScriptedArbiter;
use eyre::WrapErr;
use rstest_bdd_macros::given;

use super::world::{RoutingWorld, run_async, topic_agent};

#[given(r#"an agent "{name}" covering "{topic}" that replies "{reply}""#)]
fn replying_agent(
    world: &mut RoutingWorld,
    name: String,
    topic: String,
    reply: String,
) -> Result<(), eyre::Report> {
    run_async(world.registry.register(topic_agent(&name, &topic)))
        .wrap_err("register replying agent")?;
    world.agents = world.agents.clone().replying(&name, reply);
    Ok(())
}

#[given(r#"an agent "{name}" covering "{topic}" that fails"#)]
fn failing_agent(world: &mut RoutingWorld, name: String, topic: String) -> Result<(), eyre::Report> {
    run_async(world.registry.register(topic_agent(&name, &topic)))
        .wrap_err("register failing agent")?;
    world.agents = world.agents.clone().failing(&name, "upstream returned 503");
    Ok(())
}

#[given("the arbiter selects every candidate")]
fn arbiter_selects_all(world: &mut RoutingWorld) {
    world.arbiter = Some(Arc::new(ScriptedArbiter::selecting(0..10)));
}
