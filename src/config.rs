//! Layered runtime configuration.
//!
//! Values come from compiled defaults, then an optional TOML file, then
//! `CONCIERGE__*` environment variables (`CONCIERGE__SCORING__TOP_K=5`).

use camino::Utf8Path;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::capability::adapters::fs::FileSnapshotStore;
use crate::capability::ports::SnapshotStoreResult;
use crate::ledger::services::LedgerConfig;
use crate::orchestration::services::InvocationConfig;
use crate::routing::services::{ArbitrationConfig, ScoringConfig};
use crate::telemetry::LoggingConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CONCIERGE";

/// Where the registry snapshot lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding the snapshot and its backup.
    pub directory: String,
    /// Primary snapshot file name; the backup adds `.bak`.
    pub file_name: String,
}

impl RegistryConfig {
    /// Returns the snapshot directory.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        Utf8Path::new(&self.directory)
    }

    /// Opens the file-backed snapshot store described by this section.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open_store(&self) -> SnapshotStoreResult<FileSnapshotStore> {
        FileSnapshotStore::open(self.directory(), self.file_name.as_str())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_owned(),
            file_name: "agent_registry.json".to_owned(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConciergeConfig {
    /// Registry persistence.
    pub registry: RegistryConfig,
    /// Stage-1 weights and thresholds.
    pub scoring: ScoringConfig,
    /// Stage-2 settings.
    pub arbitration: ArbitrationConfig,
    /// Per-agent call settings.
    pub invocation: InvocationConfig,
    /// Ledger retry and excerpt settings.
    pub ledger: LedgerConfig,
    /// Log level and format.
    pub logging: LoggingConfig,
}

impl ConciergeConfig {
    /// Loads configuration from an optional TOML file and the environment.
    ///
    /// A missing file is an error only when a path was given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be read or a value has
    /// the wrong type.
    pub fn load(file: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::new(path.as_str(), FileFormat::Toml));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parses configuration from TOML text, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not valid TOML or a value
    /// has the wrong type.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
