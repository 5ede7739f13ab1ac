//! Combining agent replies into one response.

use super::AgentResult;

/// Body returned when stage 1 finds no agent for the query.
pub const NO_CAPABLE_AGENT_MESSAGE: &str =
    "Sorry, none of the available agents can help with that request.";

/// Body returned when the turn could not be completed.
pub const TURN_FAILED_MESSAGE: &str =
    "Sorry, something went wrong while handling your request. Please try again.";

/// Text shown in place of a failed agent's reply.
pub const UNAVAILABLE_NOTICE: &str = "This agent is temporarily unavailable.";

/// Renders the per-agent results as the turn's response body.
///
/// A single result is returned verbatim. Several results become `## <agent>`
/// sections in the given order.
#[must_use]
pub fn aggregate(results: &[AgentResult]) -> String {
    match results {
        [] => String::new(),
        [only] => section_body(only).to_owned(),
        many => many
            .iter()
            .map(|result| format!("## {}\n\n{}", result.agent(), section_body(result)))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn section_body(result: &AgentResult) -> &str {
    result.reply().unwrap_or(UNAVAILABLE_NOTICE)
}
