//! Validated agent name type.

use super::CapabilityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for an agent name.
const MAX_NAME_LENGTH: usize = 100;

/// Validated, case-preserving agent identifier.
///
/// Agent names are unique human-readable identifiers for registered
/// capability providers (e.g. `TicketsAgent`, `cost-analytics`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentName(String);

impl AgentName {
    /// Creates a validated agent name.
    ///
    /// The input is trimmed. Only ASCII alphanumerics, `_` and `-` are
    /// accepted; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyAgentName`] when the value is
    /// empty after trimming, [`CapabilityDomainError::InvalidAgentName`] when
    /// it contains other characters, or
    /// [`CapabilityDomainError::AgentNameTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, CapabilityDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CapabilityDomainError::EmptyAgentName);
        }

        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(CapabilityDomainError::AgentNameTooLong(raw));
        }

        let is_valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !is_valid {
            return Err(CapabilityDomainError::InvalidAgentName(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the agent name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AgentName {
    type Error = CapabilityDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentName> for String {
    fn from(name: AgentName) -> Self {
        name.0
    }
}

impl AsRef<str> for AgentName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
