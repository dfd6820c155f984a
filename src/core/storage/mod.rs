//! Expiring artifact store.
//!
//! Generated audio is parked under a storage root as `<id>.<extension>` and
//! fetched later by id. Artifacts live until they are deleted or until the
//! sweep finds them older than the configured expiry; the filesystem
//! modification time is the only record of age, so files left behind by a
//! previous run are judged the same way.
//!
//! Writes go through `object_store`'s local backend, which stages each
//! payload in a temporary file and renames it into place.

mod sweeper;

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{Error as ObjectStoreError, ObjectStore, PutPayload};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::StorageConfig;

pub use sweeper::ExpirySweeper;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Unknown, expired or malformed artifact id
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to write artifact: {0}")]
    Write(String),

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Invalid storage configuration: {0}")]
    InvalidConfiguration(String),
}

/// Length of an artifact id (UUID v4, simple form)
const ID_LEN: usize = 32;

/// Artifact ids are lowercase hex and nothing else.
pub fn is_valid_artifact_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub struct ArtifactStore {
    root: PathBuf,
    store: LocalFileSystem,
    expiry: Duration,
    extension: String,
    public_base_url: String,
    sweep_lock: Mutex<()>,
}

impl ArtifactStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        expiry: Duration,
        extension: &str,
        public_base_url: &str,
    ) -> StorageResult<Self> {
        let root = root.into();
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();

        if extension.is_empty() || !extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(StorageError::InvalidConfiguration(format!(
                "artifact extension must be ASCII alphanumeric, got '{extension}'"
            )));
        }
        if expiry.is_zero() {
            return Err(StorageError::InvalidConfiguration(
                "expiry must be greater than zero".to_string(),
            ));
        }

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::Io(format!("cannot create storage root {}: {e}", root.display()))
        })?;
        let store = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| StorageError::InvalidConfiguration(e.to_string()))?;

        info!(
            "Artifact store ready at {} (expiry {}s, extension .{})",
            root.display(),
            expiry.as_secs(),
            extension
        );

        Ok(Self {
            root,
            store,
            expiry,
            extension,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            sweep_lock: Mutex::new(()),
        })
    }

    pub fn from_config(config: &StorageConfig, public_base_url: &str) -> StorageResult<Self> {
        Self::new(
            &config.dir,
            Duration::from_secs(config.expiry_minutes * 60),
            &config.extension,
            public_base_url,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maximum artifact age before the sweep removes it
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Retrieval URL for an artifact
    pub fn url_for(&self, id: &str) -> String {
        format!("{}/file/{}", self.public_base_url, id)
    }

    fn location(&self, id: &str) -> ObjectPath {
        ObjectPath::from(format!("{id}.{}", self.extension))
    }

    /// Recreate the root if something removed it underneath us.
    async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Persist `bytes` under a fresh id and return the id.
    pub async fn save(&self, bytes: impl Into<Bytes>) -> StorageResult<String> {
        self.ensure_root()
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let bytes = bytes.into();
        let size = bytes.len();

        self.store
            .put(&self.location(&id), PutPayload::from(bytes))
            .await
            .map_err(|e| {
                error!("Failed to store artifact {}: {}", id, e);
                StorageError::Write(e.to_string())
            })?;

        info!("Stored artifact {} ({} bytes)", id, size);
        Ok(id)
    }

    /// Filesystem path of a live artifact.
    pub async fn get_path(&self, id: &str) -> StorageResult<PathBuf> {
        if !is_valid_artifact_id(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.ensure_root()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let path = self
            .store
            .path_to_filesystem(&self.location(id))
            .map_err(|e| StorageError::Io(e.to_string()))?;

        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            Ok(false) => Err(StorageError::NotFound(id.to_string())),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    /// Contents of a live artifact.
    pub async fn read(&self, id: &str) -> StorageResult<Bytes> {
        if !is_valid_artifact_id(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.ensure_root()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let result = match self.store.get(&self.location(id)).await {
            Ok(result) => result,
            Err(ObjectStoreError::NotFound { .. }) => {
                return Err(StorageError::NotFound(id.to_string()));
            }
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        // A sweep can remove the file between open and read.
        result.bytes().await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(id.to_string()),
            e => StorageError::Io(e.to_string()),
        })
    }

    /// Remove an artifact now. Returns `false` if there was nothing to remove.
    pub async fn delete(&self, id: &str) -> StorageResult<bool> {
        if !is_valid_artifact_id(id) {
            return Ok(false);
        }
        self.ensure_root()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        match self.store.delete(&self.location(id)).await {
            Ok(()) => {
                info!("Deleted artifact {}", id);
                Ok(true)
            }
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => {
                error!("Failed to delete artifact {}: {}", id, e);
                Err(StorageError::Io(e.to_string()))
            }
        }
    }

    /// Remove every file in the root older than the expiry. Returns the
    /// number removed.
    ///
    /// Failures on individual files are logged and skipped. Only one sweep
    /// runs at a time.
    pub async fn sweep(&self) -> StorageResult<usize> {
        let _guard = self.sweep_lock.lock().await;

        self.ensure_root()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let expired = self.list_expired().await?;
        let removed = self.remove_all(expired).await;

        if removed > 0 {
            info!("Sweep removed {} expired artifact(s)", removed);
        }
        Ok(removed)
    }

    /// Top-level artifacts older than the expiry. Entries the backend cannot
    /// describe are logged and skipped; only an unreadable root fails.
    async fn list_expired(&self) -> StorageResult<Vec<ObjectPath>> {
        tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", self.root.display(), e)))?;

        let now = Utc::now();
        let mut expired = Vec::new();
        let mut listing = self.store.list(None);

        while let Some(item) = listing.next().await {
            let meta = match item {
                Ok(meta) => meta,
                Err(e) => {
                    warn!("Skipping unreadable storage entry: {}", e);
                    continue;
                }
            };

            if meta.location.parts().count() != 1 {
                continue;
            }

            let is_expired = now
                .signed_duration_since(meta.last_modified)
                .to_std()
                .is_ok_and(|age| age > self.expiry);
            if is_expired {
                expired.push(meta.location);
            }
        }

        Ok(expired)
    }

    /// Delete each location, returning how many were actually removed.
    async fn remove_all(&self, locations: Vec<ObjectPath>) -> usize {
        let mut removed = 0;

        for location in locations {
            match self.store.delete(&location).await {
                Ok(()) => {
                    debug!("Swept expired artifact {}", location);
                    removed += 1;
                }
                Err(ObjectStoreError::NotFound { .. }) => {
                    debug!("Artifact {} already gone", location);
                }
                Err(e) => {
                    warn!("Failed to sweep {}: {}", location, e);
                }
            }
        }

        removed
    }
}
