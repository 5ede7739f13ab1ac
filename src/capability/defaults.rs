//! Compiled-in default agent set.
//!
//! Used when neither the primary nor the backup snapshot can be read, and on
//! first start before anything has been persisted.

use mockable::Clock;
use tracing::warn;

use super::domain::{AgentDescriptor, AgentName, CapabilityProfile, InvocationHandle};

struct DefaultAgent {
    name: &'static str,
    description: &'static str,
    domains: &'static [&'static str],
    entities: &'static [&'static str],
    operations: &'static [&'static str],
    keywords: &'static [&'static str],
    tags: &'static [&'static str],
}

const DEFAULT_AGENTS: &[DefaultAgent] = &[
    DefaultAgent {
        name: "TicketsAgent",
        description: "Looks up, creates and updates support tickets and their status.",
        domains: &["tickets", "support"],
        entities: &["ticket", "tickets", "incident", "issue"],
        operations: &["open", "close", "assign", "escalate"],
        keywords: &["helpdesk", "priority", "sla"],
        tags: &["builtin", "support"],
    },
    DefaultAgent {
        name: "CostAnalyticsAgent",
        description: "Reports cloud spend, budgets and cost breakdowns by service or team.",
        domains: &["cost", "billing", "spend"],
        entities: &["budget", "invoice", "account"],
        operations: &["forecast", "compare", "breakdown"],
        keywords: &["dollars", "expensive", "savings"],
        tags: &["builtin", "finance"],
    },
    DefaultAgent {
        name: "OxygenAgent",
        description: "Tracks learning courses, enrolments and completion progress.",
        domains: &["courses", "learning", "training"],
        entities: &["course", "courses", "module", "certificate"],
        operations: &["enrol", "complete", "progress"],
        keywords: &["lesson", "curriculum"],
        tags: &["builtin", "learning"],
    },
];

/// Transport used by the built-in agents.
pub const DEFAULT_TRANSPORT: &str = "local";

/// Builds the default descriptors in registration order.
///
/// Entries that fail validation are skipped with a warning rather than
/// aborting startup.
#[must_use]
pub fn default_descriptors(clock: &impl Clock) -> Vec<AgentDescriptor> {
    DEFAULT_AGENTS
        .iter()
        .filter_map(|entry| match build_descriptor(entry, clock) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                warn!(agent = entry.name, error = %err, "skipping invalid default agent");
                None
            }
        })
        .collect()
}

fn build_descriptor(
    entry: &DefaultAgent,
    clock: &impl Clock,
) -> Result<AgentDescriptor, crate::capability::domain::CapabilityDomainError> {
    let name = AgentName::new(entry.name)?;
    let handle = InvocationHandle::new(DEFAULT_TRANSPORT, entry.name)?;
    let profile = CapabilityProfile::new()
        .with_domains(entry.domains)
        .with_entities(entry.entities)
        .with_operations(entry.operations)
        .with_keywords(entry.keywords);
    Ok(AgentDescriptor::new(name, entry.description, profile, handle, clock)?.with_tags(entry.tags))
}
