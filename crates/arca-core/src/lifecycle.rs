//! Document lifecycle orchestration.
//!
//! [`DocumentLifecycleManager`] guarantees the attachment-consistency
//! invariants across create/update/delete, which span two independently
//! failing backends (object store, metadata store), and fires a best-effort
//! notification after a successful create without coupling its outcome to
//! the operation's success.
//!
//! Ordering rules:
//! - create: upload before insert, so a failed upload aborts with no row.
//! - update: upload the replacement before removing the previous object, so
//!   the document never points at nothing.
//! - delete: remove the object before the row, so a retry after a storage
//!   failure can still find the document.
//!
//! Concurrency: single writer per document id is assumed. Concurrent
//! updates to the same id can race; the loser's uploaded object is left
//! orphaned. There is no cross-backend transaction.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    content_excerpt, AttachmentRef, Document, DocumentCreatedNotice, UploadFile, COMMON_EXTENSIONS,
};
use crate::object_path::generate_object_path;
use crate::traits::{AttachmentStore, DocumentPatch, DocumentRepository, NewDocument, Notifier};

/// Request to create a document.
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    pub file: Option<UploadFile>,
}

/// Request to update a document: full replace of title/content, optional
/// attachment replacement.
#[derive(Debug, Clone)]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub content: String,
    pub file: Option<UploadFile>,
}

/// Orchestrates document create/update/delete across the attachment store
/// and the metadata repository, with explicitly injected collaborators.
pub struct DocumentLifecycleManager {
    documents: Arc<dyn DocumentRepository>,
    store: Arc<dyn AttachmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl DocumentLifecycleManager {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        store: Arc<dyn AttachmentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            documents,
            store,
            notifier,
        }
    }

    /// Create a document.
    ///
    /// When a file is supplied it is uploaded first; a failed upload aborts
    /// the operation with no row ever inserted. If the insert fails after a
    /// successful upload, a compensating best-effort delete of the fresh
    /// object runs before the error is returned.
    ///
    /// On success a notification is dispatched on a detached task; its
    /// outcome is logged and never awaited by the caller.
    pub async fn create(&self, req: CreateDocumentRequest) -> Result<Document> {
        validate_title(&req.title)?;
        if let Some(file) = &req.file {
            validate_file(file)?;
        }

        let attachment = match &req.file {
            Some(file) => Some(self.upload(file).await?),
            None => None,
        };

        let new = NewDocument {
            title: req.title.trim().to_string(),
            content: req.content,
            attachment: attachment.clone(),
        };

        let doc = match self.documents.insert(new).await {
            Ok(doc) => doc,
            Err(e) => {
                if let Some(a) = &attachment {
                    match self.store.remove(&a.storage_path).await {
                        Ok(()) => debug!(
                            subsystem = "lifecycle",
                            op = "create",
                            storage_path = %a.storage_path,
                            "removed uploaded object after failed insert"
                        ),
                        Err(re) => warn!(
                            subsystem = "lifecycle",
                            op = "create",
                            storage_path = %a.storage_path,
                            error = %re,
                            "compensating delete failed; object orphaned"
                        ),
                    }
                }
                return Err(e);
            }
        };

        info!(
            subsystem = "lifecycle",
            op = "create",
            document_id = %doc.id,
            has_attachment = doc.attachment.is_some(),
            "document created"
        );

        self.dispatch_notification(&doc);
        Ok(doc)
    }

    /// Update a document.
    ///
    /// With a replacement file, the new object is uploaded before the
    /// previous one is removed; removal failure is surfaced in the log (the
    /// old object is orphaned) but never blocks the metadata write, since a
    /// dangling reference is worse than a harmless orphan. Without a file,
    /// only title/content/`updated_at` change.
    pub async fn update(&self, id: Uuid, req: UpdateDocumentRequest) -> Result<Document> {
        validate_title(&req.title)?;
        if let Some(file) = &req.file {
            validate_file(file)?;
        }

        let existing = self.documents.fetch(id).await?;

        let replacement = match &req.file {
            Some(file) => {
                let new_ref = self.upload(file).await?;
                if let Some(prev) = &existing.attachment {
                    if let Err(e) = self.store.remove(&prev.storage_path).await {
                        warn!(
                            subsystem = "lifecycle",
                            op = "update",
                            document_id = %id,
                            storage_path = %prev.storage_path,
                            error = %e,
                            "previous attachment removal failed; object orphaned"
                        );
                    }
                }
                Some(new_ref)
            }
            None => None,
        };

        let patch = DocumentPatch {
            title: req.title.trim().to_string(),
            content: req.content,
            attachment: replacement,
        };

        let doc = self.documents.update(id, patch).await?;
        info!(
            subsystem = "lifecycle",
            op = "update",
            document_id = %doc.id,
            "document updated"
        );
        Ok(doc)
    }

    /// Delete a document and its owned attachment.
    ///
    /// Object removal failure is logged and does not block row deletion:
    /// an orphaned store object is preferred over an undeletable document.
    /// Once the row is gone, re-invocation fails with `DocumentNotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self.documents.fetch(id).await?;

        if let Some(a) = &existing.attachment {
            if let Err(e) = self.store.remove(&a.storage_path).await {
                warn!(
                    subsystem = "lifecycle",
                    op = "delete",
                    document_id = %id,
                    storage_path = %a.storage_path,
                    error = %e,
                    "attachment removal failed; proceeding with metadata delete"
                );
            }
        }

        self.documents.delete(id).await?;
        info!(
            subsystem = "lifecycle",
            op = "delete",
            document_id = %id,
            "document deleted"
        );
        Ok(())
    }

    /// Fetch a single document by id.
    pub async fn get(&self, id: Uuid) -> Result<Document> {
        self.documents.fetch(id).await
    }

    /// List all documents, newest first.
    pub async fn list(&self) -> Result<Vec<Document>> {
        self.documents.list().await
    }

    /// Build the notification payload for a created document.
    pub fn notification_notice(doc: &Document) -> DocumentCreatedNotice {
        DocumentCreatedNotice {
            title: doc.title.clone(),
            content_excerpt: content_excerpt(&doc.content),
            file_name: doc.attachment.as_ref().map(|a| a.file_name.clone()),
            file_url: doc.attachment.as_ref().map(|a| a.public_url.clone()),
        }
    }

    /// Upload a file under a freshly generated object path.
    async fn upload(&self, file: &UploadFile) -> Result<AttachmentRef> {
        let path = generate_object_path(&file.file_name);

        if !has_common_extension(&file.file_name) {
            debug!(
                subsystem = "lifecycle",
                op = "upload",
                file_name = %file.file_name,
                "uncommon upload extension"
            );
        }

        let url = self.store.put(&path, &file.bytes, &file.mime_type).await?;
        debug!(
            subsystem = "lifecycle",
            op = "upload",
            storage_path = %path,
            size_bytes = file.bytes.len(),
            "attachment stored"
        );

        Ok(AttachmentRef {
            file_name: file.file_name.clone(),
            storage_path: path,
            public_url: url,
            size_bytes: file.bytes.len() as i64,
            mime_type: file.mime_type.clone(),
        })
    }

    /// Fire the created-document notification on a detached task.
    ///
    /// The task outlives the request path; its outcome is only logged.
    /// In-flight notifications may be dropped at process exit.
    fn dispatch_notification(&self, doc: &Document) {
        let notice = Self::notification_notice(doc);
        let notifier = self.notifier.clone();
        let document_id = doc.id;
        tokio::spawn(async move {
            let outcome = notifier.notify(notice).await;
            if outcome.delivered {
                info!(
                    subsystem = "lifecycle",
                    op = "notify",
                    document_id = %document_id,
                    delivered = true,
                    "notification delivered"
                );
            } else {
                warn!(
                    subsystem = "lifecycle",
                    op = "notify",
                    document_id = %document_id,
                    delivered = false,
                    error = outcome.error_detail.as_deref().unwrap_or("unknown"),
                    "notification not delivered"
                );
            }
        });
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    Ok(())
}

fn validate_file(file: &UploadFile) -> Result<()> {
    if file.file_name.is_empty() {
        return Err(Error::Validation("file name is required".to_string()));
    }
    if file.mime_type.is_empty() {
        return Err(Error::Validation("file content type is required".to_string()));
    }
    if file.bytes.is_empty() {
        return Err(Error::Validation("file is empty".to_string()));
    }
    Ok(())
}

fn has_common_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| COMMON_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
