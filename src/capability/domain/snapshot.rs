//! Versioned registry snapshot, the unit of persistence.

use super::{
    AgentDescriptor, AgentName, DESCRIPTOR_SCHEMA_VERSION, RegistryFilter, SnapshotValidationError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Summary statistics persisted alongside the descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatistics {
    /// Number of registered agents.
    pub total_agents: usize,
    /// Number of agents participating in routing.
    pub enabled_agents: usize,
    /// Number of agents excluded from routing.
    pub disabled_agents: usize,
    /// Number of agents carrying each tag.
    pub tag_counts: BTreeMap<String, usize>,
}

impl RegistryStatistics {
    fn compute<'a>(descriptors: impl Iterator<Item = &'a AgentDescriptor>) -> Self {
        let mut statistics = Self::default();
        for descriptor in descriptors {
            statistics.total_agents += 1;
            if descriptor.is_enabled() {
                statistics.enabled_agents += 1;
            } else {
                statistics.disabled_agents += 1;
            }
            for tag in descriptor.tags() {
                *statistics.tag_counts.entry(tag.clone()).or_default() += 1;
            }
        }
        statistics
    }
}

/// Immutable view of the registry at one version.
///
/// Snapshots are cloned and edited off to the side, then committed, so a
/// snapshot that readers hold never changes underneath them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    version: u64,
    last_updated: DateTime<Utc>,
    next_registration_order: u64,
    agents: BTreeMap<AgentName, AgentDescriptor>,
    statistics: RegistryStatistics,
}

impl RegistrySnapshot {
    /// Creates an empty snapshot at version zero.
    #[must_use]
    pub fn empty(clock: &impl Clock) -> Self {
        Self {
            version: 0,
            last_updated: clock.utc(),
            next_registration_order: 0,
            agents: BTreeMap::new(),
            statistics: RegistryStatistics::default(),
        }
    }

    /// Builds a committed snapshot from descriptors in registration order.
    ///
    /// Later descriptors with a name already present are ignored.
    #[must_use]
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = AgentDescriptor>,
        clock: &impl Clock,
    ) -> Self {
        let mut snapshot = Self::empty(clock);
        for descriptor in descriptors {
            if snapshot.agents.contains_key(descriptor.name()) {
                continue;
            }
            snapshot.insert_new(descriptor);
        }
        snapshot.commit(clock);
        snapshot
    }

    /// Returns the snapshot version. Every committed mutation bumps it.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the time of the last committed mutation.
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Returns the summary statistics.
    #[must_use]
    pub const fn statistics(&self) -> &RegistryStatistics {
        &self.statistics
    }

    /// Returns the number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns `true` when no agents are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &AgentName) -> Option<&AgentDescriptor> {
        self.agents.get(name)
    }

    /// Returns `true` when an agent with the name is registered.
    #[must_use]
    pub fn contains(&self, name: &AgentName) -> bool {
        self.agents.contains_key(name)
    }

    /// Iterates all descriptors in name order.
    pub fn descriptors(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.values()
    }

    /// Returns enabled descriptors sorted by registration order.
    #[must_use]
    pub fn enabled_in_registration_order(&self) -> Vec<&AgentDescriptor> {
        let mut enabled: Vec<&AgentDescriptor> =
            self.agents.values().filter(|d| d.is_enabled()).collect();
        enabled.sort_by_key(|d| d.registration_order());
        enabled
    }

    /// Returns descriptors matching the filter, sorted by registration order.
    #[must_use]
    pub fn filtered(&self, filter: &RegistryFilter) -> Vec<AgentDescriptor> {
        let mut matching: Vec<AgentDescriptor> = self
            .agents
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        matching.sort_by_key(AgentDescriptor::registration_order);
        matching
    }

    /// Checks structural invariants of a decoded snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotValidationError`] describing the first violated
    /// invariant.
    pub fn validate(&self) -> Result<(), SnapshotValidationError> {
        let mut seen_orders = BTreeSet::new();
        for (key, descriptor) in &self.agents {
            if key != descriptor.name() {
                return Err(SnapshotValidationError::KeyMismatch {
                    key: key.clone(),
                    name: descriptor.name().clone(),
                });
            }
            let version = descriptor.schema_version();
            if version == 0 || version > DESCRIPTOR_SCHEMA_VERSION {
                return Err(SnapshotValidationError::UnsupportedSchemaVersion {
                    name: descriptor.name().clone(),
                    version,
                });
            }
            let order = descriptor.registration_order();
            if order >= self.next_registration_order {
                return Err(SnapshotValidationError::RegistrationOrderOutOfRange {
                    name: descriptor.name().clone(),
                    order,
                });
            }
            if !seen_orders.insert(order) {
                return Err(SnapshotValidationError::DuplicateRegistrationOrder(order));
            }
        }

        if RegistryStatistics::compute(self.agents.values()) != self.statistics {
            return Err(SnapshotValidationError::StatisticsMismatch);
        }
        Ok(())
    }

    /// Inserts a descriptor under its name, assigning the next registration
    /// order. Returns `false` without change when the name is taken.
    pub(crate) fn insert_new(&mut self, mut descriptor: AgentDescriptor) -> bool {
        if self.agents.contains_key(descriptor.name()) {
            return false;
        }
        descriptor.assign_registration_order(self.next_registration_order);
        self.next_registration_order += 1;
        self.agents.insert(descriptor.name().clone(), descriptor);
        true
    }

    pub(crate) fn get_mut(&mut self, name: &AgentName) -> Option<&mut AgentDescriptor> {
        self.agents.get_mut(name)
    }

    pub(crate) fn remove(&mut self, name: &AgentName) -> Option<AgentDescriptor> {
        self.agents.remove(name)
    }

    /// Bumps the version, stamps the update time and refreshes statistics.
    pub(crate) fn commit(&mut self, clock: &impl Clock) {
        self.version += 1;
        self.last_updated = clock.utc();
        self.statistics = RegistryStatistics::compute(self.agents.values());
    }
}
