//! Filesystem snapshot store and configuration integration tests.

mod test_helpers;

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use concierge::capability::{
    adapters::FileSnapshotStore,
    domain::{CapabilityProfile, RegistryFilter},
    ports::{SnapshotSlot, SnapshotStore},
    services::{CapabilityRegistry, RegisterAgentRequest, SnapshotSource},
};
use concierge::config::{ConciergeConfig, RegistryConfig};
use concierge::telemetry::LogFormat;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use test_helpers::EnvVarGuard;

const FILE_NAME: &str = "agent_registry.json";

struct Workspace {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    fn store(&self) -> FileSnapshotStore {
        FileSnapshotStore::open(&self.root, FILE_NAME).expect("store opens")
    }

    fn registry(&self) -> CapabilityRegistry<FileSnapshotStore, DefaultClock> {
        CapabilityRegistry::new(Arc::new(self.store()), Arc::new(DefaultClock))
    }
}

#[fixture]
fn workspace() -> Workspace {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8Path::from_path(temp.path())
        .expect("utf-8 temp path")
        .join("registry");
    Workspace { _temp: temp, root }
}

fn billing_request() -> RegisterAgentRequest {
    RegisterAgentRequest::new("BillingAgent", "Explains invoices", "http", "https://billing.local")
        .with_profile(CapabilityProfile::new().with_domains(["billing"]))
        .with_tags(vec!["finance".to_owned()])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_start_writes_defaults_to_disk(workspace: Workspace) {
    let registry = workspace.registry();

    let report = registry.load().await;

    assert_eq!(report.source, SnapshotSource::Defaults);
    assert!(workspace.path(FILE_NAME).exists());
    assert!(!workspace.path(&format!("{FILE_NAME}.tmp")).exists());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saved_registry_reloads_identically(workspace: Workspace) {
    let registry = workspace.registry();
    registry.load().await;
    registry
        .register(billing_request())
        .await
        .expect("registration persists");
    let saved = registry.snapshot();

    let reloaded = workspace
        .store()
        .load(SnapshotSlot::Primary)
        .await
        .expect("primary readable")
        .expect("primary present");

    assert_eq!(&reloaded, saved.as_ref());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupt_primary_recovers_from_backup(workspace: Workspace) {
    let registry = workspace.registry();
    registry.load().await;
    registry
        .register(billing_request())
        .await
        .expect("registration persists");
    fs::write(workspace.path(FILE_NAME), "{ truncated").expect("corrupt primary");

    let restarted = workspace.registry();
    let report = restarted.load().await;

    assert_eq!(report.source, SnapshotSource::Backup);
    assert_eq!(report.failures.len(), 1);
    assert!(restarted.get("BillingAgent").expect("valid name").is_none());
    assert_eq!(restarted.list(&RegistryFilter::all()).len(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mutation_after_recovery_backs_up_recovered_snapshot(workspace: Workspace) {
    let seeded = workspace.registry();
    seeded.load().await;
    seeded
        .register(
            RegisterAgentRequest::new("ScratchAgent", "Temporary", "local", "scratch")
                .with_profile(CapabilityProfile::new().with_domains(["scratch"])),
        )
        .await
        .expect("registration persists");
    fs::write(workspace.path(FILE_NAME), "{ truncated").expect("corrupt primary");
    let recovered = workspace.registry();
    assert_eq!(recovered.load().await.source, SnapshotSource::Backup);

    recovered
        .register(billing_request())
        .await
        .expect("registration persists");

    let backup = workspace
        .store()
        .load(SnapshotSlot::Backup)
        .await
        .expect("backup decodes")
        .expect("backup present");
    assert_eq!(backup.len(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupt_primary_and_backup_fall_back_to_defaults(workspace: Workspace) {
    let registry = workspace.registry();
    registry.load().await;
    registry
        .register(billing_request())
        .await
        .expect("registration persists");
    fs::write(workspace.path(FILE_NAME), "not json").expect("corrupt primary");
    fs::write(workspace.path(&format!("{FILE_NAME}.bak")), "[]").expect("corrupt backup");

    let restarted = workspace.registry();
    let report = restarted.load().await;

    assert_eq!(report.source, SnapshotSource::Defaults);
    assert!(report.is_corrupt_state());
    assert_eq!(
        fs::read_to_string(workspace.path(FILE_NAME)).expect("primary kept"),
        "not json"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registry_config_opens_the_configured_store(workspace: Workspace) {
    let config = RegistryConfig {
        directory: workspace.root.to_string(),
        file_name: "custom.json".to_owned(),
    };

    let store = config.open_store().expect("store opens");
    store
        .save(&workspace.registry().snapshot())
        .await
        .expect("save succeeds");

    assert_eq!(store.file_name(), "custom.json");
    assert_eq!(store.backup_file_name(), "custom.json.bak");
    assert!(workspace.path("custom.json").exists());
}

#[rstest]
fn toml_overrides_defaults_per_section() {
    let config = ConciergeConfig::from_toml(
        r#"
        [scoring]
        top_k = 3
        min_score = 0.2

        [ledger]
        excerpt_chars = 120

        [ledger.retry]
        max_attempts = 5

        [logging]
        format = "json"
        "#,
    )
    .expect("valid configuration");

    assert_eq!(config.scoring.top_k, 3);
    assert_eq!(config.scoring.domain_weight.to_bits(), 0.4_f64.to_bits());
    assert_eq!(config.ledger.excerpt_chars, 120);
    assert_eq!(config.ledger.retry.max_attempts, 5);
    assert_eq!(config.ledger.retry.base_delay_ms, 100);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.arbitration.timeout_ms, 8_000);
    assert_eq!(config.registry, RegistryConfig::default());
}

#[rstest]
fn config_file_is_loaded_from_disk(workspace: Workspace) {
    fs::create_dir_all(&workspace.root).expect("workspace dir");
    let path = workspace.path("concierge.toml");
    fs::write(&path, "[invocation]\ntimeout_ms = 2500\n").expect("config written");

    let config = ConciergeConfig::load(Some(path.as_path())).expect("config loads");

    assert_eq!(config.invocation.timeout_ms, 2_500);
}

#[rstest]
fn missing_config_file_is_an_error(workspace: Workspace) {
    let result = ConciergeConfig::load(Some(workspace.path("absent.toml").as_path()));

    assert!(result.is_err());
}

#[rstest]
fn environment_overrides_file_values(workspace: Workspace) {
    fs::create_dir_all(&workspace.root).expect("workspace dir");
    let path = workspace.path("concierge.toml");
    fs::write(&path, "[registry]\nfile_name = \"from_file.json\"\n").expect("config written");
    let _env = EnvVarGuard::set(&[
        ("CONCIERGE__REGISTRY__FILE_NAME", "from_env.json"),
        ("CONCIERGE__ARBITRATION__TIMEOUT_MS", "1500"),
    ]);

    let config = ConciergeConfig::load(Some(path.as_path())).expect("config loads");

    assert_eq!(config.registry.file_name, "from_env.json");
    assert_eq!(config.arbitration.timeout_ms, 1_500);
}
