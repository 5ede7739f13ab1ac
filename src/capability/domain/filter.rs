//! Listing filter for registry queries.

use super::AgentDescriptor;

/// Predicate used by registry listings.
///
/// An empty filter matches every descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryFilter {
    tag: Option<String>,
    enabled: Option<bool>,
}

impl RegistryFilter {
    /// Creates a filter that matches every descriptor.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts matches to descriptors carrying the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tag = Some(tag.as_ref().trim().to_lowercase());
        self
    }

    /// Restricts matches to descriptors with the given enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Returns `true` when the descriptor satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, descriptor: &AgentDescriptor) -> bool {
        let tag_matches = self
            .tag
            .as_ref()
            .is_none_or(|tag| descriptor.tags().contains(tag));
        let enabled_matches = self
            .enabled
            .is_none_or(|enabled| descriptor.is_enabled() == enabled);
        tag_matches && enabled_matches
    }
}
