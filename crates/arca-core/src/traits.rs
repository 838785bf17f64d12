//! Core traits for arca's external collaborators.
//!
//! These traits define the seams between the document lifecycle logic and
//! its independently-failing backends (object store, metadata store, mail
//! relay), enabling pluggable implementations and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AttachmentRef, Document, DocumentCreatedNotice, NotificationOutcome};

// =============================================================================
// ATTACHMENT STORE
// =============================================================================

/// Thin contract over the binary object store holding attachments.
///
/// Implementations abstract over filesystem, bucket-API, or other providers.
/// All calls are single-attempt; callers decide whether to retry.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store `bytes` under `path` and return the object's public URL.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    /// Remove the object at `path`. Idempotent: removing an already-absent
    /// path is not an error.
    async fn remove(&self, path: &str) -> Result<()>;

    /// Check whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool>;
}

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

/// Fields for a new metadata row. The attachment unit, when present, has
/// already been confirmed stored.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub attachment: Option<AttachmentRef>,
}

/// Full-replace patch applied by update. `attachment` is `Some` only when a
/// replacement object has been confirmed stored; `None` leaves the existing
/// unit untouched.
#[derive(Debug, Clone)]
pub struct DocumentPatch {
    pub title: String,
    pub content: String,
    pub attachment: Option<AttachmentRef>,
}

/// Repository for document metadata rows.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new row, assigning id and timestamps.
    async fn insert(&self, new: NewDocument) -> Result<Document>;

    /// Fetch a document by id. Fails with `Error::DocumentNotFound` if absent.
    async fn fetch(&self, id: Uuid) -> Result<Document>;

    /// Apply a patch and refresh `updated_at`. Fails with
    /// `Error::DocumentNotFound` if absent.
    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document>;

    /// Delete a row. Fails with `Error::DocumentNotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// List all documents ordered by `created_at` descending.
    async fn list(&self) -> Result<Vec<Document>>;
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Thin contract over the mail transport.
///
/// Infallible by construction: transports translate their native error shape
/// into a [`NotificationOutcome`] and never raise, because notification is
/// explicitly non-critical.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: DocumentCreatedNotice) -> NotificationOutcome;
}

/// No-op notifier for tests and unconfigured deployments.
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _notice: DocumentCreatedNotice) -> NotificationOutcome {
        NotificationOutcome::failed("notification transport not configured")
    }
}
