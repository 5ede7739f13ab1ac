//! Error types for capability domain validation.

use super::AgentName;
use thiserror::Error;

/// Errors returned while constructing capability domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityDomainError {
    /// The agent name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// The agent name contains characters outside `[A-Za-z0-9_-]`.
    #[error(
        "agent name '{0}' contains invalid characters (only ASCII alphanumerics, '_' and '-' allowed)"
    )]
    InvalidAgentName(String),

    /// The agent name exceeds the 100-character limit.
    #[error("agent name exceeds 100 character limit: {0}")]
    AgentNameTooLong(String),

    /// The agent description is empty after trimming.
    #[error("agent description must not be empty")]
    EmptyDescription,

    /// The invocation handle transport is empty after trimming.
    #[error("invocation handle transport must not be empty")]
    EmptyTransport,

    /// The invocation handle target is empty after trimming.
    #[error("invocation handle target must not be empty")]
    EmptyTarget,
}

/// Structural problems found while validating a decoded registry snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotValidationError {
    /// A map key does not match the name of the descriptor stored under it.
    #[error("registry key '{key}' holds descriptor named '{name}'")]
    KeyMismatch {
        /// Map key.
        key: AgentName,
        /// Descriptor name.
        name: AgentName,
    },

    /// A descriptor declares a schema version this build cannot read.
    #[error("agent '{name}' has unsupported schema version {version}")]
    UnsupportedSchemaVersion {
        /// Descriptor name.
        name: AgentName,
        /// Declared schema version.
        version: u32,
    },

    /// Two descriptors share a registration order.
    #[error("registration order {0} is assigned to more than one agent")]
    DuplicateRegistrationOrder(u64),

    /// A descriptor's registration order was never issued by the snapshot.
    #[error("agent '{name}' has registration order {order} beyond issued range")]
    RegistrationOrderOutOfRange {
        /// Descriptor name.
        name: AgentName,
        /// Offending order.
        order: u64,
    },

    /// Persisted statistics disagree with the descriptors.
    #[error("registry statistics do not match descriptors")]
    StatisticsMismatch,
}
