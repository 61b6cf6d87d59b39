use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{RetroError, RetroResult};

/// Blob storage for event payloads and generated artifacts. Keys are opaque
/// slash-separated paths, never interpreted by the trait itself.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> RetroResult<Vec<u8>>;
    async fn put(&self, key: &str, bytes: Vec<u8>) -> RetroResult<()>;
}

/// Filesystem-backed store for local/dev use. Production deployments back
/// onto an object store such as S3; that adapter is out of scope here.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> RetroResult<Vec<u8>> {
        let path = self.resolve(key);
        let mut file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| RetroError::Upstream(format!("object store get {key}: {e}")))?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .await
            .map_err(|e| RetroError::Upstream(format!("object store read {key}: {e}")))?;

        Ok(buf)
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> RetroResult<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RetroError::Upstream(format!("object store mkdir for {key}: {e}")))?;
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| RetroError::Upstream(format!("object store put {key}: {e}")))?;

        file.write_all(&bytes)
            .await
            .map_err(|e| RetroError::Upstream(format!("object store write {key}: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_through_the_filesystem() {
        let dir = std::env::temp_dir().join(format!("retro-core-objstore-test-{}", std::process::id()));
        let store = FsObjectStore::new(&dir);

        store.put("p/s/analysis.json", b"{\"ok\":true}".to_vec()).await.unwrap();
        let back = store.get("p/s/analysis.json").await.unwrap();
        assert_eq!(back, b"{\"ok\":true}");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let store = FsObjectStore::new(std::env::temp_dir().join("retro-core-objstore-missing"));
        assert!(store.get("does/not/exist.json").await.is_err());
    }
}
