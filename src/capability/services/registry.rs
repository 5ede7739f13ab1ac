//! Service layer for the capability registry.
//!
//! Provides [`CapabilityRegistry`], which owns the in-memory snapshot,
//! serialises mutations behind a single writer, and persists every committed
//! mutation through a [`SnapshotStore`].

use crate::capability::{
    defaults::default_descriptors,
    domain::{
        AgentDescriptor, AgentName, CapabilityDomainError, CapabilityProfile, DescriptorPatch,
        InvocationHandle, RegistryFilter, RegistrySnapshot,
    },
    ports::{SnapshotSlot, SnapshotStore, SnapshotStoreError},
};
use mockable::Clock;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Request payload for registering a new agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAgentRequest {
    name: String,
    description: String,
    transport: String,
    target: String,
    profile: CapabilityProfile,
    tags: Vec<String>,
    enabled: bool,
}

impl RegisterAgentRequest {
    /// Creates a request with the required descriptor fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        transport: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            transport: transport.into(),
            target: target.into(),
            profile: CapabilityProfile::new(),
            tags: Vec::new(),
            enabled: true,
        }
    }

    /// Sets the capability profile.
    #[must_use]
    pub fn with_profile(mut self, profile: CapabilityProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Registers the agent in the disabled state.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn into_descriptor(self, clock: &impl Clock) -> Result<AgentDescriptor, CapabilityDomainError> {
        let Self {
            name,
            description,
            transport,
            target,
            profile,
            tags,
            enabled,
        } = self;

        let agent_name = AgentName::new(name)?;
        let handle = InvocationHandle::new(transport, target)?;
        let descriptor =
            AgentDescriptor::new(agent_name, description, profile, handle, clock)?.with_tags(tags);
        Ok(if enabled {
            descriptor
        } else {
            descriptor.disabled()
        })
    }
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Descriptor validation failed; no state changed.
    #[error(transparent)]
    Domain(#[from] CapabilityDomainError),

    /// An agent with the same name is already registered; no state changed.
    #[error("agent already registered: {0}")]
    DuplicateAgent(AgentName),

    /// No agent with the given name is registered.
    #[error("agent not found: {0}")]
    NotFound(AgentName),

    /// The snapshot could not be persisted; in-memory state is unchanged.
    #[error(transparent)]
    Persistence(#[from] SnapshotStoreError),
}

impl RegistryServiceError {
    /// Returns `true` for errors rejected synchronously by validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(_) | Self::DuplicateAgent(_))
    }
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Where the snapshot in use at startup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotSource {
    /// The primary snapshot decoded cleanly.
    Primary,
    /// The primary was absent or unreadable; the backup was used.
    Backup,
    /// Neither copy was usable; the compiled-in defaults were used.
    Defaults,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Backup => f.write_str("backup"),
            Self::Defaults => f.write_str("defaults"),
        }
    }
}

/// Outcome of [`CapabilityRegistry::load`].
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Source of the snapshot now in use.
    pub source: SnapshotSource,
    /// Version of the snapshot now in use.
    pub version: u64,
    /// Number of agents in the snapshot now in use.
    pub agents: usize,
    /// Failures encountered along the fallback chain, in order.
    pub failures: Vec<SnapshotStoreError>,
}

impl LoadReport {
    /// Returns `true` when both persisted copies failed to decode and the
    /// registry fell back to compiled defaults.
    #[must_use]
    pub fn is_corrupt_state(&self) -> bool {
        self.source == SnapshotSource::Defaults
            && self
                .failures
                .iter()
                .filter(|failure| matches!(failure, SnapshotStoreError::Corrupt { .. }))
                .count()
                == 2
    }
}

enum Mutation<T> {
    Changed(T),
    Unchanged(T),
}

/// Durable directory of agent descriptors.
///
/// Reads clone an `Arc` of the current snapshot under a short read guard and
/// never wait on the writer. Mutations are serialised by an async writer
/// lock, edit a private copy, back up the persisted snapshot, persist the new
/// one atomically and only then publish it. A failed write leaves the
/// published snapshot untouched.
pub struct CapabilityRegistry<S, C>
where
    S: SnapshotStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    defaults: Vec<AgentDescriptor>,
    current: RwLock<Arc<RegistrySnapshot>>,
    source: RwLock<Option<SnapshotSource>>,
    writer: Mutex<()>,
}

impl<S, C> CapabilityRegistry<S, C>
where
    S: SnapshotStore,
    C: Clock + Send + Sync,
{
    /// Creates a registry using the built-in default agent set as the last
    /// fallback. Call [`Self::load`] before routing.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        let defaults = default_descriptors(&*clock);
        Self::with_defaults(store, clock, defaults)
    }

    /// Creates a registry with a custom fallback agent set.
    #[must_use]
    pub fn with_defaults(store: Arc<S>, clock: Arc<C>, defaults: Vec<AgentDescriptor>) -> Self {
        let empty = RegistrySnapshot::empty(&*clock);
        Self {
            store,
            clock,
            defaults,
            current: RwLock::new(Arc::new(empty)),
            source: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    /// Loads the persisted snapshot, falling back from primary to backup to
    /// compiled defaults.
    ///
    /// Never fails: every fallback step is logged and reported. When no
    /// snapshot has ever been persisted the defaults are written so the next
    /// start reads a primary.
    pub async fn load(&self) -> LoadReport {
        let _writer = self.writer.lock().await;
        let mut failures = Vec::new();

        for slot in [SnapshotSlot::Primary, SnapshotSlot::Backup] {
            match self.store.load(slot).await {
                Ok(Some(snapshot)) => {
                    let source = match slot {
                        SnapshotSlot::Primary => SnapshotSource::Primary,
                        SnapshotSlot::Backup => SnapshotSource::Backup,
                    };
                    if source == SnapshotSource::Backup {
                        warn!(
                            version = snapshot.version(),
                            "registry restored from backup snapshot"
                        );
                    }
                    return self.finish_load(snapshot, source, failures);
                }
                Ok(None) => debug!(%slot, "no registry snapshot in slot"),
                Err(err) => {
                    info!(%slot, error = %err, "registry snapshot unusable, trying next source");
                    failures.push(err);
                }
            }
        }

        let snapshot = RegistrySnapshot::from_descriptors(self.defaults.clone(), &*self.clock);
        if failures.is_empty() {
            info!("no persisted registry found, seeding compiled defaults");
            if let Err(err) = self.store.save(&snapshot).await {
                warn!(error = %err, "failed to persist default registry");
            }
        } else {
            warn!(
                failures = failures.len(),
                "corrupt registry state: primary and backup unusable, falling back to compiled defaults"
            );
        }
        self.finish_load(snapshot, SnapshotSource::Defaults, failures)
    }

    fn finish_load(
        &self,
        snapshot: RegistrySnapshot,
        source: SnapshotSource,
        failures: Vec<SnapshotStoreError>,
    ) -> LoadReport {
        let report = LoadReport {
            source,
            version: snapshot.version(),
            agents: snapshot.len(),
            failures,
        };
        self.publish(Arc::new(snapshot));
        *self.source.write() = Some(source);
        info!(
            %source,
            version = report.version,
            agents = report.agents,
            "capability registry loaded"
        );
        report
    }

    /// Returns the source recorded by the last [`Self::load`].
    #[must_use]
    pub fn loaded_from(&self) -> Option<SnapshotSource> {
        *self.source.read()
    }

    /// Returns the current immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Lists descriptors matching the filter in registration order.
    #[must_use]
    pub fn list(&self, filter: &RegistryFilter) -> Vec<AgentDescriptor> {
        self.snapshot().filtered(filter)
    }

    /// Finds a descriptor by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when the name is invalid.
    pub fn get(&self, name: &str) -> RegistryServiceResult<Option<AgentDescriptor>> {
        let agent_name = AgentName::new(name)?;
        Ok(self.snapshot().get(&agent_name).cloned())
    }

    /// Registers a new agent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] or
    /// [`RegistryServiceError::DuplicateAgent`] when validation fails, or
    /// [`RegistryServiceError::Persistence`] when the snapshot cannot be
    /// written.
    pub async fn register(
        &self,
        request: RegisterAgentRequest,
    ) -> RegistryServiceResult<AgentDescriptor> {
        let descriptor = request.into_descriptor(&*self.clock)?;
        let name = descriptor.name().clone();

        self.mutate("register", |snapshot, _clock| {
            if !snapshot.insert_new(descriptor) {
                return Err(RegistryServiceError::DuplicateAgent(name.clone()));
            }
            let stored = snapshot
                .get(&name)
                .cloned()
                .ok_or_else(|| RegistryServiceError::NotFound(name.clone()))?;
            Ok(Mutation::Changed(stored))
        })
        .await
    }

    /// Applies a partial update to an agent.
    ///
    /// An empty or no-op patch persists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] for unknown agents,
    /// [`RegistryServiceError::Domain`] for invalid patches, or
    /// [`RegistryServiceError::Persistence`] when the snapshot cannot be
    /// written.
    pub async fn update(
        &self,
        name: &str,
        patch: DescriptorPatch,
    ) -> RegistryServiceResult<AgentDescriptor> {
        let agent_name = AgentName::new(name)?;
        self.mutate("update", |snapshot, clock| {
            let descriptor = snapshot
                .get_mut(&agent_name)
                .ok_or_else(|| RegistryServiceError::NotFound(agent_name.clone()))?;
            let changed = descriptor.apply(patch, clock)?;
            let updated = descriptor.clone();
            Ok(if changed {
                Mutation::Changed(updated)
            } else {
                Mutation::Unchanged(updated)
            })
        })
        .await
    }

    /// Removes an agent from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] for unknown agents or
    /// [`RegistryServiceError::Persistence`] when the snapshot cannot be
    /// written.
    pub async fn deregister(&self, name: &str) -> RegistryServiceResult<AgentDescriptor> {
        let agent_name = AgentName::new(name)?;
        self.mutate("deregister", |snapshot, _clock| {
            snapshot
                .remove(&agent_name)
                .map(Mutation::Changed)
                .ok_or_else(|| RegistryServiceError::NotFound(agent_name.clone()))
        })
        .await
    }

    /// Enables or disables an agent.
    ///
    /// Setting the current value persists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] for unknown agents or
    /// [`RegistryServiceError::Persistence`] when the snapshot cannot be
    /// written.
    pub async fn set_enabled(
        &self,
        name: &str,
        enabled: bool,
    ) -> RegistryServiceResult<AgentDescriptor> {
        let agent_name = AgentName::new(name)?;
        self.mutate(if enabled { "enable" } else { "disable" }, |snapshot, clock| {
            let descriptor = snapshot
                .get_mut(&agent_name)
                .ok_or_else(|| RegistryServiceError::NotFound(agent_name.clone()))?;
            let changed = descriptor.set_enabled(enabled, clock);
            let updated = descriptor.clone();
            Ok(if changed {
                Mutation::Changed(updated)
            } else {
                Mutation::Unchanged(updated)
            })
        })
        .await
    }

    /// Enables an agent.
    ///
    /// # Errors
    ///
    /// See [`Self::set_enabled`].
    pub async fn enable(&self, name: &str) -> RegistryServiceResult<AgentDescriptor> {
        self.set_enabled(name, true).await
    }

    /// Disables an agent.
    ///
    /// # Errors
    ///
    /// See [`Self::set_enabled`].
    pub async fn disable(&self, name: &str) -> RegistryServiceResult<AgentDescriptor> {
        self.set_enabled(name, false).await
    }

    async fn mutate<F, T>(&self, operation: &'static str, edit: F) -> RegistryServiceResult<T>
    where
        F: FnOnce(&mut RegistrySnapshot, &C) -> RegistryServiceResult<Mutation<T>>,
    {
        let _writer = self.writer.lock().await;
        let current = self.snapshot();
        let mut next = (*current).clone();

        let value = match edit(&mut next, &*self.clock)? {
            Mutation::Changed(value) => value,
            Mutation::Unchanged(value) => {
                debug!(operation, "registry mutation is a no-op, nothing persisted");
                return Ok(value);
            }
        };
        next.commit(&*self.clock);

        if let Err(err) = self.persist(&current, &next).await {
            warn!(
                operation,
                version = current.version(),
                error = %err,
                "registry mutation rolled back, snapshot not persisted"
            );
            return Err(err.into());
        }

        let version = next.version();
        self.publish(Arc::new(next));
        info!(operation, version, "registry mutation committed");
        Ok(value)
    }

    /// Backs up the published snapshot, then saves its successor. The backup
    /// comes from memory because the primary on disk may be the corrupt copy
    /// that `load` skipped.
    async fn persist(
        &self,
        previous: &RegistrySnapshot,
        next: &RegistrySnapshot,
    ) -> Result<(), SnapshotStoreError> {
        self.store.backup(previous).await?;
        self.store.save(next).await
    }

    fn publish(&self, snapshot: Arc<RegistrySnapshot>) {
        *self.current.write() = snapshot;
    }
}
