//! When steps for routing BDD scenarios.

use concierge::orchestration::domain::TurnRequest;
use rstest_bdd_macros::when;

use super::world::{RoutingWorld, run_async};

#[when(r#""{user}" asks "{query}""#)]
fn user_asks(world: &mut RoutingWorld, user: String, query: String) -> Result<(), eyre::Report> {
    let coordinator = world.coordinator()?;
    let response = run_async(coordinator.handle_turn(TurnRequest::new(user, query)));
    world.last_response = Some(response);
    Ok(())
}

#[when(r#""{user}" follows up with "{query}""#)]
fn user_follows_up(
    world: &mut RoutingWorld,
    user: String,
    query: String,
) -> Result<(), eyre::Report> {
    let session_id = world
        .response()?
        .session_id()
        .ok_or_else(|| eyre::eyre!("previous turn has no session"))?;
    let coordinator = world.coordinator()?;
    let response =
        run_async(coordinator.handle_turn(TurnRequest::new(user, query).in_session(session_id)));
    world.last_response = Some(response);
    Ok(())
}
