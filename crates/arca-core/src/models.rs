//! Core data models for arca.
//!
//! These types are shared across all arca crates and represent the
//! document domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// A document: title, free-text content, and an optional uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Time-ordered UUIDv7, assigned at creation. Immutable.
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Present as a unit or absent entirely; never partially populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
    /// Set once at creation. Immutable.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update. Always >= created_at.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Check the attachment-unit and timestamp invariants hold.
    pub fn is_consistent(&self) -> bool {
        let unit_ok = match &self.attachment {
            Some(a) => {
                !a.file_name.is_empty()
                    && !a.storage_path.is_empty()
                    && !a.public_url.is_empty()
                    && !a.mime_type.is_empty()
                    && a.size_bytes >= 0
            }
            None => true,
        };
        unit_ok && self.updated_at >= self.created_at
    }
}

/// Reference to a binary object held out-of-line in the attachment store.
///
/// All five fields are required whenever the reference exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Original client file name (e.g. "report.pdf").
    pub file_name: String,
    /// Object key within the attachment store.
    pub storage_path: String,
    /// Public download URL returned by the store at upload time.
    pub public_url: String,
    pub size_bytes: i64,
    pub mime_type: String,
}

/// An uploaded file as received from the client, before it reaches the store.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// File extensions the original upload form offered. The server accepts any
/// type; uploads outside this list are logged at debug for operator review.
pub const COMMON_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "ppt", "pptx",
];

// =============================================================================
// NOTIFICATION TYPES
// =============================================================================

/// Maximum number of characters of document content carried in a
/// notification body.
pub const NOTICE_EXCERPT_CHARS: usize = 500;

/// Payload describing a freshly created document, handed to the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCreatedNotice {
    pub title: String,
    /// First [`NOTICE_EXCERPT_CHARS`] characters of the document content.
    pub content_excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Uniform notification result, regardless of the underlying transport.
///
/// Notification is non-critical: transports report through this value and
/// never raise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl NotificationOutcome {
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            error_detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            delivered: false,
            error_detail: Some(detail.into()),
        }
    }
}

/// Truncate content to the excerpt length carried in notifications.
///
/// Operates on characters, not bytes, so multibyte content cannot be split
/// mid-codepoint.
pub fn content_excerpt(content: &str) -> String {
    content.chars().take(NOTICE_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_attachment() -> AttachmentRef {
        AttachmentRef {
            file_name: "a.pdf".to_string(),
            storage_path: "docs/1700000000000_x1y2z3.pdf".to_string(),
            public_url: "https://files.example.net/docs/1700000000000_x1y2z3.pdf".to_string(),
            size_bytes: 1024,
            mime_type: "application/pdf".to_string(),
        }
    }

    fn sample_document(attachment: Option<AttachmentRef>) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::now_v7(),
            title: "Spec v1".to_string(),
            content: "body text".to_string(),
            attachment,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_document_without_attachment_is_consistent() {
        assert!(sample_document(None).is_consistent());
    }

    #[test]
    fn test_document_with_full_attachment_is_consistent() {
        assert!(sample_document(Some(sample_attachment())).is_consistent());
    }

    #[test]
    fn test_document_with_blank_storage_path_is_inconsistent() {
        let mut a = sample_attachment();
        a.storage_path = String::new();
        assert!(!sample_document(Some(a)).is_consistent());
    }

    #[test]
    fn test_document_updated_before_created_is_inconsistent() {
        let mut doc = sample_document(None);
        doc.updated_at = doc.created_at - Duration::seconds(1);
        assert!(!doc.is_consistent());
    }

    #[test]
    fn test_document_serialization_omits_absent_attachment() {
        let json = serde_json::to_string(&sample_document(None)).unwrap();
        assert!(!json.contains("attachment"));
    }

    #[test]
    fn test_content_excerpt_short_content_unchanged() {
        assert_eq!(content_excerpt("body text"), "body text");
    }

    #[test]
    fn test_content_excerpt_truncates_at_limit() {
        let long = "x".repeat(NOTICE_EXCERPT_CHARS + 100);
        let excerpt = content_excerpt(&long);
        assert_eq!(excerpt.chars().count(), NOTICE_EXCERPT_CHARS);
    }

    #[test]
    fn test_content_excerpt_respects_char_boundaries() {
        let long: String = "é".repeat(NOTICE_EXCERPT_CHARS + 10);
        let excerpt = content_excerpt(&long);
        assert_eq!(excerpt.chars().count(), NOTICE_EXCERPT_CHARS);
    }

    #[test]
    fn test_notification_outcome_constructors() {
        let ok = NotificationOutcome::delivered();
        assert!(ok.delivered);
        assert!(ok.error_detail.is_none());

        let failed = NotificationOutcome::failed("relay timed out");
        assert!(!failed.delivered);
        assert_eq!(failed.error_detail.unwrap(), "relay timed out");
    }
}
