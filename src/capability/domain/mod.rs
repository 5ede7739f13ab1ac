//! Domain model for the capability registry.
//!
//! Agent descriptors carry a capability profile for scoring and an opaque
//! invocation handle for dispatch. Snapshots group descriptors into the
//! versioned unit that is persisted and scored. All infrastructure concerns
//! are kept outside the domain boundary.

mod descriptor;
mod error;
mod filter;
mod handle;
mod name;
mod profile;
mod snapshot;

pub use descriptor::{AgentDescriptor, DESCRIPTOR_SCHEMA_VERSION, DescriptorPatch};
pub use error::{CapabilityDomainError, SnapshotValidationError};
pub use filter::RegistryFilter;
pub use handle::InvocationHandle;
pub use name::AgentName;
pub use profile::CapabilityProfile;
pub use snapshot::{RegistrySnapshot, RegistryStatistics};
