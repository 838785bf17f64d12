//! # arca-store
//!
//! Attachment object-store backends for arca.
//!
//! Two implementations of [`arca_core::AttachmentStore`]:
//! - [`FilesystemStore`]: local disk, objects served from a configured
//!   public base URL
//! - [`HttpObjectStore`]: remote bucket API over HTTP
//!
//! Both honor the store contract: `put` returns the object's public URL,
//! `remove` is idempotent against already-absent paths.

pub mod filesystem;
pub mod http;

pub use filesystem::FilesystemStore;
pub use http::HttpObjectStore;
