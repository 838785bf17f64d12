//! Bucket-API attachment store.
//!
//! Talks to a remote object-store HTTP API (Supabase-storage style):
//! objects are uploaded to `{base}/object/{bucket}/{path}` and served from
//! `{base}/object/public/{bucket}/{path}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use arca_core::{AttachmentStore, Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote bucket-API storage backend.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpObjectStore {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key: api_key.into(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl AttachmentStore for HttpObjectStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        debug!(
            subsystem = "store",
            component = "http_store",
            op = "put",
            storage_path = %path,
            size_bytes = bytes.len(),
            "uploading object"
        );

        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| Error::Storage(format!("upload {}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "upload {} rejected: {} {}",
                path, status, body
            )));
        }

        Ok(self.public_url(path))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("remove {}: {}", path, e)))?;

        let status = response.status();
        // Removing an already-absent object is not an error.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Storage(format!(
            "remove {} rejected: {} {}",
            path, status, body
        )))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.object_url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("stat {}: {}", path, e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Error::Storage(format!("stat {} rejected: {}", path, status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_shape() {
        let store = HttpObjectStore::new("https://storage.example.net", "documents", "key");
        assert_eq!(
            store.object_url("docs/1_ab.pdf"),
            "https://storage.example.net/object/documents/docs/1_ab.pdf"
        );
    }

    #[test]
    fn test_public_url_shape() {
        let store = HttpObjectStore::new("https://storage.example.net", "documents", "key");
        assert_eq!(
            store.public_url("docs/1_ab.pdf"),
            "https://storage.example.net/object/public/documents/docs/1_ab.pdf"
        );
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let store = HttpObjectStore::new("https://storage.example.net/", "documents", "key");
        assert_eq!(
            store.object_url("docs/1_ab.pdf"),
            "https://storage.example.net/object/documents/docs/1_ab.pdf"
        );
    }
}
