//! Filesystem snapshot store using capability-based directory handles.
//!
//! The primary snapshot lives at `<file>`, the backup at `<file>.bak`. Writes
//! go to a `.tmp` sibling that is synced and then renamed over the target, so
//! a crash mid-write leaves the previous file in place.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::sync::Arc;
use tracing::debug;

use crate::capability::{
    domain::RegistrySnapshot,
    ports::{
        SnapshotSlot, SnapshotStore, SnapshotStoreError, SnapshotStoreResult, decode_snapshot,
        encode_snapshot,
    },
};

/// JSON snapshot store rooted in a single directory.
#[derive(Clone)]
pub struct FileSnapshotStore {
    dir: Arc<Dir>,
    file_name: Arc<str>,
}

impl FileSnapshotStore {
    /// Opens (creating if needed) the directory holding the snapshot files.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(
        directory: impl AsRef<Utf8Path>,
        file_name: impl Into<String>,
    ) -> SnapshotStoreResult<Self> {
        let path = directory.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(SnapshotStoreError::io)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(SnapshotStoreError::io)?;
        Ok(Self {
            dir: Arc::new(dir),
            file_name: Arc::from(file_name.into()),
        })
    }

    /// Returns the primary snapshot file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the backup snapshot file name.
    #[must_use]
    pub fn backup_file_name(&self) -> String {
        backup_name(&self.file_name)
    }

    async fn run_blocking<F, T>(&self, f: F) -> SnapshotStoreResult<T>
    where
        F: FnOnce(&Dir, &str) -> SnapshotStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let file_name = Arc::clone(&self.file_name);
        tokio::task::spawn_blocking(move || f(&dir, &file_name))
            .await
            .map_err(SnapshotStoreError::io)?
    }
}

impl fmt::Debug for FileSnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSnapshotStore")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, slot: SnapshotSlot) -> SnapshotStoreResult<Option<RegistrySnapshot>> {
        self.run_blocking(move |dir, file_name| {
            let target = match slot {
                SnapshotSlot::Primary => file_name.to_owned(),
                SnapshotSlot::Backup => backup_name(file_name),
            };
            match dir.read_to_string(&target) {
                Ok(text) => decode_snapshot(slot, &text).map(Some),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(SnapshotStoreError::io(err)),
            }
        })
        .await
    }

    async fn backup(&self, snapshot: &RegistrySnapshot) -> SnapshotStoreResult<()> {
        let document = encode_snapshot(snapshot)?;
        let version = snapshot.version();
        self.run_blocking(move |dir, file_name| {
            let backup = backup_name(file_name);
            let staging = temp_name(&backup);
            write_synced(dir, &staging, document.as_bytes())?;
            dir.rename(&staging, dir, &backup)
                .map_err(SnapshotStoreError::io)?;
            debug!(file = %backup, version, "registry backup refreshed");
            Ok(())
        })
        .await
    }

    async fn save(&self, snapshot: &RegistrySnapshot) -> SnapshotStoreResult<()> {
        let document = encode_snapshot(snapshot)?;
        let version = snapshot.version();
        self.run_blocking(move |dir, file_name| {
            let staging = temp_name(file_name);
            write_synced(dir, &staging, document.as_bytes())?;
            dir.rename(&staging, dir, file_name)
                .map_err(SnapshotStoreError::io)?;
            debug!(file = %file_name, version, "registry snapshot written");
            Ok(())
        })
        .await
    }
}

fn write_synced(dir: &Dir, name: &str, bytes: &[u8]) -> SnapshotStoreResult<()> {
    let mut file = dir.create(name).map_err(SnapshotStoreError::io)?;
    file.write_all(bytes).map_err(SnapshotStoreError::io)?;
    file.sync_all().map_err(SnapshotStoreError::io)
}

fn backup_name(file_name: &str) -> String {
    format!("{file_name}.bak")
}

fn temp_name(file_name: &str) -> String {
    format!("{file_name}.tmp")
}
