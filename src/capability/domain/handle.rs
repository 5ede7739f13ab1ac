//! Opaque invocation handle.

use super::CapabilityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes how to reach an agent without naming any executable code.
///
/// The `transport` selects which invocable implementation handles the call;
/// the `target` is interpreted only by that implementation (an endpoint URL,
/// a queue name, an in-process key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationHandle {
    transport: String,
    target: String,
}

impl InvocationHandle {
    /// Creates a validated invocation handle.
    ///
    /// The transport is trimmed and lowercased; the target is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyTransport`] or
    /// [`CapabilityDomainError::EmptyTarget`] when either part is blank.
    pub fn new(
        raw_transport: impl Into<String>,
        raw_target: impl Into<String>,
    ) -> Result<Self, CapabilityDomainError> {
        let transport = raw_transport.into().trim().to_ascii_lowercase();
        let target = raw_target.into().trim().to_owned();

        if transport.is_empty() {
            return Err(CapabilityDomainError::EmptyTransport);
        }
        if target.is_empty() {
            return Err(CapabilityDomainError::EmptyTarget);
        }

        Ok(Self { transport, target })
    }

    /// Returns the transport identifier.
    #[must_use]
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Returns the transport-specific target.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for InvocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.transport, self.target)
    }
}
