use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::gateway::{GatewayError, GatewayResult, ObjectStorage, StoredObject};

/// Filesystem object storage; objects are served back under `{public_base}/{path}`
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a relative object path into the root, refusing anything that escapes it
    fn resolve(&self, path: &str) -> GatewayResult<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(GatewayError::rejected(format!("invalid storage path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> GatewayResult<StoredObject> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::Storage(e.to_string()))?;
        }

        debug!("Writing {} bytes ({}) to {}", bytes.len(), content_type, target.display());
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base, path),
            path: path.to_string(),
        })
    }

    async fn delete(&self, path: &str) -> GatewayResult<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                info!("Deleted stored object {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GatewayError::NotFound(format!("stored object {}", path)))
            }
            Err(e) => Err(GatewayError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost:3000/files/");

        let stored = storage.upload(b"abc".to_vec(), "dishes/a.jpg", "image/jpeg").await.unwrap();
        assert_eq!(stored.url, "http://localhost:3000/files/dishes/a.jpg");
        assert!(dir.path().join("dishes/a.jpg").exists());

        storage.delete("dishes/a.jpg").await.unwrap();
        assert!(!dir.path().join("dishes/a.jpg").exists());
        assert!(matches!(storage.delete("dishes/a.jpg").await, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost/files");
        for path in ["../etc/passwd", "/abs.jpg", "dishes/../../x", ""] {
            let err = storage.upload(vec![1], path, "image/jpeg").await.unwrap_err();
            assert!(matches!(err, GatewayError::Rejected { .. }), "{path} accepted");
        }
    }
}
