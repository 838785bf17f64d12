//! # arca-core
//!
//! Core types, traits, and document lifecycle logic for arca.
//!
//! This crate provides:
//! - The document data model and its attachment-consistency invariants
//! - Collaborator traits for the object store, metadata repository, and
//!   mail transport
//! - [`DocumentLifecycleManager`], which orchestrates create/update/delete
//!   across the two independently-failing backends
//! - Process configuration and the error taxonomy
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arca_core::{CreateDocumentRequest, DocumentLifecycleManager};
//!
//! let manager = DocumentLifecycleManager::new(documents, store, notifier);
//! let doc = manager
//!     .create(CreateDocumentRequest {
//!         title: "Spec v1".to_string(),
//!         content: "body text".to_string(),
//!         file: None,
//!     })
//!     .await?;
//! println!("Created document: {}", doc.id);
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod object_path;
pub mod traits;

pub use config::{
    parse_recipients, Config, NotifyConfig, StorageConfig, DEFAULT_NOTIFY_RECIPIENT,
    DEFAULT_NOTIFY_SENDER,
};
pub use error::{Error, Result};
pub use lifecycle::{CreateDocumentRequest, DocumentLifecycleManager, UpdateDocumentRequest};
pub use models::{
    content_excerpt, AttachmentRef, Document, DocumentCreatedNotice, NotificationOutcome,
    UploadFile, COMMON_EXTENSIONS, NOTICE_EXCERPT_CHARS,
};
pub use object_path::{generate_object_path, OBJECT_PREFIX};
pub use traits::{
    AttachmentStore, DocumentPatch, DocumentRepository, NewDocument, NoOpNotifier, Notifier,
};
