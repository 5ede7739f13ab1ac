//! Application services for the capability registry.

mod registry;

pub use registry::{
    CapabilityRegistry, LoadReport, RegisterAgentRequest, RegistryServiceError,
    RegistryServiceResult, SnapshotSource,
};
