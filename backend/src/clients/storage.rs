use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid artifact name '{0}'")]
    InvalidName(String),
    #[error("artifact '{0}' not found")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob storage for report artifacts and uploaded batches. Names are
/// forward-slash separated paths relative to the store root.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch_by_name(&self, name: &str) -> Result<Vec<u8>, StorageError>;
    async fn save(&self, name: &str, data: Vec<u8>) -> Result<(), StorageError>;
}

/// Filesystem-backed store under a configured root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Artifact names come from remote responses and uploads; anything that
    /// could escape the root is rejected outright.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let invalid = name.is_empty()
            || name.starts_with('/')
            || name.contains('\\')
            || name
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if invalid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn fetch_by_name(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, name: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(())
    }
}
