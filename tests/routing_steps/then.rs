//! Then steps for routing BDD scenarios.

use concierge::orchestration::domain::{TurnOutcome, UNAVAILABLE_NOTICE};
use rstest_bdd_macros::then;

use super::world::{RoutingWorld, run_async};

fn expect_outcome(world: &RoutingWorld, expected: TurnOutcome) -> Result<(), eyre::Report> {
    let outcome = world.response()?.outcome();
    if outcome != expected {
        return Err(eyre::eyre!("expected {expected:?}, got {outcome:?}"));
    }
    Ok(())
}

#[then("the turn is answered")]
fn turn_answered(world: &RoutingWorld) -> Result<(), eyre::Report> {
    expect_outcome(world, TurnOutcome::Answered)
}

#[then("no capable agent is found")]
fn no_capable_agent(world: &RoutingWorld) -> Result<(), eyre::Report> {
    expect_outcome(world, TurnOutcome::NoCapableAgent)
}

#[then(r#"the response has a section for "{agent}""#)]
fn has_section(world: &RoutingWorld, agent: String) -> Result<(), eyre::Report> {
    let heading = format!("## {agent}\n");
    if !world.response()?.body().contains(&heading) {
        return Err(eyre::eyre!("no section for {agent} in response"));
    }
    Ok(())
}

#[then(r#"the section for "{agent}" says the agent is temporarily unavailable"#)]
fn section_unavailable(world: &RoutingWorld, agent: String) -> Result<(), eyre::Report> {
    let section = format!("## {agent}\n\n{UNAVAILABLE_NOTICE}");
    if !world.response()?.body().contains(&section) {
        return Err(eyre::eyre!("section for {agent} is not marked unavailable"));
    }
    Ok(())
}

#[then(r#"the response is exactly "{body}""#)]
fn response_is(world: &RoutingWorld, body: String) -> Result<(), eyre::Report> {
    let actual = world.response()?.body();
    if actual != body {
        return Err(eyre::eyre!("expected body {body:?}, got {actual:?}"));
    }
    Ok(())
}

#[then("no agent was invoked")]
fn no_agent_invoked(world: &RoutingWorld) -> Result<(), eyre::Report> {
    let calls = world.agents.call_count();
    if calls != 0 {
        return Err(eyre::eyre!("expected no agent calls, saw {calls}"));
    }
    Ok(())
}

#[then("the arbiter was not consulted")]
fn arbiter_not_consulted(world: &RoutingWorld) -> Result<(), eyre::Report> {
    let calls = world
        .arbiter
        .as_ref()
        .ok_or_else(|| eyre::eyre!("scenario did not configure an arbiter"))?
        .calls();
    if calls != 0 {
        return Err(eyre::eyre!("expected no arbiter calls, saw {calls}"));
    }
    Ok(())
}

#[then("{count:usize} invocations are recorded for the session")]
fn invocations_recorded(world: &RoutingWorld, count: usize) -> Result<(), eyre::Report> {
    let session_id = world
        .response()?
        .session_id()
        .ok_or_else(|| eyre::eyre!("turn has no session"))?;
    let recorded = run_async(world.ledger.invocations(session_id))
        .map_err(|err| eyre::eyre!("invocations lookup failed: {err}"))?;
    if recorded.len() != count {
        return Err(eyre::eyre!(
            "expected {count} invocations, found {}",
            recorded.len()
        ));
    }
    Ok(())
}

#[then(r#"the invocation of "{agent}" is recorded as failed"#)]
fn invocation_failed(world: &RoutingWorld, agent: String) -> Result<(), eyre::Report> {
    let session_id = world
        .response()?
        .session_id()
        .ok_or_else(|| eyre::eyre!("turn has no session"))?;
    let recorded = run_async(world.ledger.invocations(session_id))
        .map_err(|err| eyre::eyre!("invocations lookup failed: {err}"))?;
    let record = recorded
        .iter()
        .find(|record| record.agent_name().as_str() == agent)
        .ok_or_else(|| eyre::eyre!("no invocation recorded for {agent}"))?;
    if record.success() {
        return Err(eyre::eyre!("{agent} was recorded as successful"));
    }
    Ok(())
}
