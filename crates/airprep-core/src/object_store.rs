//! Blob store adapter: containers of byte objects addressed by `/`-separated keys.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

pub const OCTET_STREAM: &str = "application/octet-stream";

const PARTIAL_SUFFIX: &str = ".partial";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {container}/{key}")]
    NotFound { container: String, key: String },
    #[error("invalid container name '{0}'")]
    InvalidContainer(String),
    #[error("invalid object key '{0}'")]
    InvalidKey(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("listing failed: {0}")]
    Listing(String),
}

pub trait BlobStore {
    /// Keys in `container` starting with `prefix`, sorted.
    fn list(&self, container: &str, prefix: &str) -> Result<Vec<String>, StoreError>;
    fn exists(&self, container: &str, key: &str) -> Result<bool, StoreError>;
    fn size(&self, container: &str, key: &str) -> Result<u64, StoreError>;
    fn read_bytes(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError>;
    fn write_bytes(
        &self,
        container: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError>;
}

fn validate_container(container: &str) -> Result<(), StoreError> {
    if container.is_empty()
        || container == "."
        || container == ".."
        || container.contains(['/', '\\'])
    {
        return Err(StoreError::InvalidContainer(container.to_string()));
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad_segment = key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if key.is_empty() || key.contains('\\') || bad_segment {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Filesystem-backed store. Each container is a directory under `root`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf, StoreError> {
        validate_container(container)?;
        Ok(self.root.join(container))
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        let dir = self.container_dir(container)?;
        Ok(key.split('/').fold(dir, |path, segment| path.join(segment)))
    }

    fn not_found_or_io(container: &str, key: &str, path: PathBuf, err: io::Error) -> StoreError {
        if err.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            }
        } else {
            StoreError::Io { path, source: err }
        }
    }
}

impl BlobStore for LocalBlobStore {
    fn list(&self, container: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.container_dir(container)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let dir_str = dir
            .to_str()
            .ok_or_else(|| StoreError::Listing(format!("non UTF-8 path {}", dir.display())))?;
        let pattern = format!("{}/**/*", glob::Pattern::escape(dir_str));

        let mut keys = Vec::new();
        let entries = glob::glob(&pattern).map_err(|err| StoreError::Listing(err.to_string()))?;
        for entry in entries {
            let path = entry.map_err(|err| StoreError::Listing(err.to_string()))?;
            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&dir) else {
                continue;
            };
            let key = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.ends_with(PARTIAL_SUFFIX) || !key.starts_with(prefix) {
                continue;
            }
            keys.push(key);
        }

        keys.sort();
        Ok(keys)
    }

    fn exists(&self, container: &str, key: &str) -> Result<bool, StoreError> {
        Ok(self.object_path(container, key)?.is_file())
    }

    fn size(&self, container: &str, key: &str) -> Result<u64, StoreError> {
        let path = self.object_path(container, key)?;
        match fs::metadata(&path) {
            Ok(metadata) => Ok(metadata.len()),
            Err(err) => Err(Self::not_found_or_io(container, key, path, err)),
        }
    }

    fn read_bytes(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(container, key)?;
        fs::read(&path).map_err(|err| Self::not_found_or_io(container, key, path, err))
    }

    /// Writes to a sibling `.partial` file and renames it into place, so readers never see
    /// a half-written object.
    fn write_bytes(
        &self,
        container: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        let path = self.object_path(container, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        fs::write(&partial, bytes).map_err(|source| StoreError::Io {
            path: partial.clone(),
            source,
        })?;
        fs::rename(&partial, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(container, key, content_type, bytes = bytes.len(), "Wrote object");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), StoredObject>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seeds an object with a `text/csv` content type.
    pub fn insert(&self, container: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects().insert(
            (container.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.into(),
                content_type: "text/csv".to_string(),
            },
        );
    }

    pub fn object(&self, container: &str, key: &str) -> Option<StoredObject> {
        self.objects()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    fn get(&self, container: &str, key: &str) -> Result<StoredObject, StoreError> {
        self.object(container, key)
            .ok_or_else(|| StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }
}

impl BlobStore for MemoryBlobStore {
    fn list(&self, container: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        validate_container(container)?;
        Ok(self
            .objects()
            .keys()
            .filter(|(owner, key)| owner == container && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }

    fn exists(&self, container: &str, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        Ok(self.object(container, key).is_some())
    }

    fn size(&self, container: &str, key: &str) -> Result<u64, StoreError> {
        Ok(self.get(container, key)?.bytes.len() as u64)
    }

    fn read_bytes(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        Ok(self.get(container, key)?.bytes)
    }

    fn write_bytes(
        &self,
        container: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        validate_container(container)?;
        validate_key(key)?;
        self.objects().insert(
            (container.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
