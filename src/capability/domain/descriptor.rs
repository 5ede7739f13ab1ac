//! Agent descriptor aggregate root.

use super::{AgentName, CapabilityDomainError, CapabilityProfile, InvocationHandle};
use super::profile::normalise_terms;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Schema version written by this build for every descriptor.
pub const DESCRIPTOR_SCHEMA_VERSION: u32 = 1;

/// A registered capability provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    name: AgentName,
    description: String,
    profile: CapabilityProfile,
    handle: InvocationHandle,
    #[serde(default)]
    tags: BTreeSet<String>,
    enabled: bool,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    registration_order: u64,
    schema_version: u32,
}

/// Partial update applied to an existing descriptor.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorPatch {
    description: Option<String>,
    profile: Option<CapabilityProfile>,
    handle: Option<InvocationHandle>,
    tags: Option<BTreeSet<String>>,
}

impl DescriptorPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the capability profile.
    #[must_use]
    pub fn with_profile(mut self, profile: CapabilityProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Replaces the invocation handle.
    #[must_use]
    pub fn with_handle(mut self, handle: InvocationHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = Some(normalise_terms(tags));
        self
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.profile.is_none()
            && self.handle.is_none()
            && self.tags.is_none()
    }
}

impl AgentDescriptor {
    /// Creates an enabled descriptor stamped with the current clock time.
    ///
    /// The registration order is assigned when the descriptor is inserted
    /// into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyDescription`] when the
    /// description is blank.
    pub fn new(
        name: AgentName,
        raw_description: impl Into<String>,
        profile: CapabilityProfile,
        handle: InvocationHandle,
        clock: &impl Clock,
    ) -> Result<Self, CapabilityDomainError> {
        let description = validate_description(raw_description.into())?;
        let timestamp = clock.utc();
        Ok(Self {
            name,
            description,
            profile,
            handle,
            tags: BTreeSet::new(),
            enabled: true,
            registered_at: timestamp,
            updated_at: timestamp,
            registration_order: 0,
            schema_version: DESCRIPTOR_SCHEMA_VERSION,
        })
    }

    /// Sets the tag set, normalised to trimmed lowercase.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalise_terms(tags);
        self
    }

    /// Marks the descriptor as initially disabled.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns the agent name.
    #[must_use]
    pub const fn name(&self) -> &AgentName {
        &self.name
    }

    /// Returns the human-readable description shown to the arbiter.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the capability profile.
    #[must_use]
    pub const fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// Returns the invocation handle.
    #[must_use]
    pub const fn handle(&self) -> &InvocationHandle {
        &self.handle
    }

    /// Returns the tag set.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns whether the agent participates in routing.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the position of this agent in registration order.
    #[must_use]
    pub const fn registration_order(&self) -> u64 {
        self.registration_order
    }

    /// Returns the descriptor schema version.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Enables or disables the agent.
    ///
    /// Returns `true` when the flag changed. Setting the current value is a
    /// no-op that leaves timestamps untouched.
    pub fn set_enabled(&mut self, enabled: bool, clock: &impl Clock) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        self.touch(clock);
        true
    }

    /// Applies a partial update.
    ///
    /// Returns `true` when any field changed.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyDescription`] when the patch
    /// carries a blank description. The descriptor is unchanged on error.
    pub fn apply(
        &mut self,
        patch: DescriptorPatch,
        clock: &impl Clock,
    ) -> Result<bool, CapabilityDomainError> {
        let DescriptorPatch {
            description,
            profile,
            handle,
            tags,
        } = patch;

        let validated_description = description.map(validate_description).transpose()?;
        let mut changed = false;

        if let Some(new_description) = validated_description
            && new_description != self.description
        {
            self.description = new_description;
            changed = true;
        }
        if let Some(new_profile) = profile
            && new_profile != self.profile
        {
            self.profile = new_profile;
            changed = true;
        }
        if let Some(new_handle) = handle
            && new_handle != self.handle
        {
            self.handle = new_handle;
            changed = true;
        }
        if let Some(new_tags) = tags
            && new_tags != self.tags
        {
            self.tags = new_tags;
            changed = true;
        }

        if changed {
            self.touch(clock);
        }
        Ok(changed)
    }

    pub(crate) const fn assign_registration_order(&mut self, order: u64) {
        self.registration_order = order;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validate_description(raw: String) -> Result<String, CapabilityDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CapabilityDomainError::EmptyDescription);
    }
    Ok(trimmed.to_owned())
}
