//! Descriptor state storage
//!
//! Each provisioned instance is recorded as one `<id>.1and1.spec` file in the
//! state directory. Listings are filtered on the file name alone, so unrelated
//! files in a shared directory (such as the system temp dir) are never parsed.
//!
//! No locking happens here: file names are unique per instance id.

use crate::error::StoreError;
use crate::instance::InstanceId;
use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use tokio::fs;

/// Provider tag embedded in descriptor file names
pub const PROVIDER_SUFFIX: &str = "1and1";

const DESCRIPTOR_EXT: &str = "spec";

static DESCRIPTOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^instance-[0-9]+\.1and1\.spec$").expect("descriptor pattern is valid")
});

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key under which the descriptor of `id` is stored
pub fn descriptor_key(id: &InstanceId) -> String {
    format!("{}.{}.{}", id, PROVIDER_SUFFIX, DESCRIPTOR_EXT)
}

/// Pattern matching every descriptor key
pub fn descriptor_pattern() -> &'static Regex {
    &DESCRIPTOR_PATTERN
}

/// Small key-value store over named blobs
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Fails with [`StoreError::NotFound`] when `key` is absent
    async fn read(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Fails with [`StoreError::NotFound`] when `key` is absent
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// All entries whose key matches `pattern`, ordered by key
    async fn list_matching(&self, pattern: &Regex) -> StoreResult<Vec<(String, Vec<u8>)>>;
}

/// Filesystem-backed store rooted at a directory
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    async fn ensure_dir(&self) -> StoreResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await?;
            tracing::debug!("Created state directory: {}", self.dir.display());
        }
        Ok(())
    }
}

fn not_found(key: &str, err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(key.to_string())
    } else {
        StoreError::Io(err)
    }
}

#[async_trait]
impl StateStore for FsStore {
    async fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        self.ensure_dir().await?;
        let path = self.path(key);
        fs::write(&path, bytes).await?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        fs::read(self.path(key)).await.map_err(|e| not_found(key, e))
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path(key);
        fs::remove_file(&path).await.map_err(|e| not_found(key, e))?;
        tracing::debug!("Removed {}", path.display());
        Ok(())
    }

    async fn list_matching(&self, pattern: &Regex) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("State directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if pattern.is_match(&name) {
                names.push(name);
            }
        }
        names.sort();

        let mut result = Vec::with_capacity(names.len());
        for name in names {
            let bytes = self.read(&name).await?;
            result.push((name, bytes));
        }
        Ok(result)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A poisoned map is still structurally valid
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list_matching(&self, pattern: &Regex) -> StoreResult<Vec<(String, Vec<u8>)>> {
        Ok(self
            .lock()
            .iter()
            .filter(|(k, _)| pattern.is_match(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
