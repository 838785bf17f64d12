//! Filesystem attachment store.
//!
//! Stores objects under a base directory, serving them through a configured
//! public base URL (a reverse proxy or static file route in front of the
//! same directory).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use arca_core::{AttachmentStore, Error, Result};

/// Filesystem storage backend.
pub struct FilesystemStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemStore {
    /// Create a new filesystem store rooted at `root`, with objects
    /// publicly reachable under `public_base_url`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        // Object keys must stay under the storage root.
        if Path::new(path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::Storage(format!("invalid object path: {}", path)));
        }
        Ok(self.root.join(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), path)
    }

    /// Validate that the store can write, read, and delete objects.
    ///
    /// Performs a full round-trip at startup to catch filesystem issues
    /// (permission errors, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.root.join(".health-check");
        let test_file = test_dir.join("probe.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"store-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_back = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_back != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for FilesystemStore {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<String> {
        let full_path = self.full_path(path)?;
        debug!(
            subsystem = "store",
            component = "filesystem",
            op = "put",
            storage_path = %path,
            size_bytes = bytes.len(),
            "writing object"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "create_dir_all failed");
                Error::Storage(format!("create {}: {}", parent.display(), e))
            })?;
        }

        // Atomic write: temp file + rename.
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Storage(format!("create {}: {}", temp_path.display(), e)))?;
        file.write_all(bytes)
            .await
            .map_err(|e| Error::Storage(format!("write {}: {}", temp_path.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| Error::Storage(format!("sync {}: {}", temp_path.display(), e)))?;
        drop(file);

        fs::rename(&temp_path, &full_path)
            .await
            .map_err(|e| Error::Storage(format!("rename to {}: {}", full_path.display(), e)))?;

        Ok(self.public_url(path))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        // Removing an already-absent object is not an error.
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "remove {}: {}",
                full_path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path)?;
        fs::try_exists(&full_path)
            .await
            .map_err(|e| Error::Storage(format!("stat {}: {}", full_path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &tempfile::TempDir) -> FilesystemStore {
        FilesystemStore::new(dir.path(), "http://localhost:3000/files")
    }

    #[tokio::test]
    async fn test_put_then_exists() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store
            .put("docs/1_ab.pdf", b"hello", "application/pdf")
            .await
            .unwrap();
        assert!(store.exists("docs/1_ab.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_returns_public_url() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let url = store
            .put("docs/1_ab.pdf", b"hello", "application/pdf")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/files/docs/1_ab.pdf");
    }

    #[tokio::test]
    async fn test_remove_deletes_object() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store
            .put("docs/1_ab.pdf", b"hello", "application/pdf")
            .await
            .unwrap();
        store.remove("docs/1_ab.pdf").await.unwrap();
        assert!(!store.exists("docs/1_ab.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_absent_path_is_ok() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        // Idempotent: removing what is not there succeeds.
        store.remove("docs/never_uploaded.pdf").await.unwrap();
        store
            .put("docs/1_ab.pdf", b"hello", "application/pdf")
            .await
            .unwrap();
        store.remove("docs/1_ab.pdf").await.unwrap();
        store.remove("docs/1_ab.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_object() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        store
            .put("docs/1_ab.txt", b"first", "text/plain")
            .await
            .unwrap();
        store
            .put("docs/1_ab.txt", b"second", "text/plain")
            .await
            .unwrap();

        let content = tokio::fs::read(dir.path().join("docs/1_ab.txt")).await.unwrap();
        assert_eq!(content, b"second");
    }

    #[tokio::test]
    async fn test_traversal_path_is_rejected() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let err = store
            .put("../outside.bin", b"x", "application/octet-stream")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.validate().await.unwrap();
    }
}
