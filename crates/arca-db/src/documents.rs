//! Document repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::warn;
use uuid::Uuid;

use arca_core::{
    AttachmentRef, Document, DocumentPatch, DocumentRepository, Error, NewDocument, Result,
};

/// PostgreSQL implementation of DocumentRepository.
///
/// The five attachment columns are nullable as a unit: a row either carries
/// all of them or none. A partially populated unit (which the lifecycle
/// layer never writes) decodes as absent and is logged at warn.
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

const DOCUMENT_COLUMNS: &str = "id, title, content, file_name, storage_path, public_url, \
     size_bytes, mime_type, created_at, updated_at";

impl PgDocumentRepository {
    /// Create a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, new: NewDocument) -> Result<Document> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let a = new.attachment.as_ref();

        let row = sqlx::query(&format!(
            "INSERT INTO document \
                 (id, title, content, file_name, storage_path, public_url, \
                  size_bytes, mime_type, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&new.title)
        .bind(&new.content)
        .bind(a.map(|a| a.file_name.as_str()))
        .bind(a.map(|a| a.storage_path.as_str()))
        .bind(a.map(|a| a.public_url.as_str()))
        .bind(a.map(|a| a.size_bytes))
        .bind(a.map(|a| a.mime_type.as_str()))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(document_from_row(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        let row = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM document WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::DocumentNotFound(id))?;

        Ok(document_from_row(&row))
    }

    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let now = Utc::now();

        let row = match patch.attachment {
            Some(a) => {
                sqlx::query(&format!(
                    "UPDATE document SET \
                         title = $2, content = $3, updated_at = $4, \
                         file_name = $5, storage_path = $6, public_url = $7, \
                         size_bytes = $8, mime_type = $9 \
                     WHERE id = $1 \
                     RETURNING {DOCUMENT_COLUMNS}"
                ))
                .bind(id)
                .bind(&patch.title)
                .bind(&patch.content)
                .bind(now)
                .bind(&a.file_name)
                .bind(&a.storage_path)
                .bind(&a.public_url)
                .bind(a.size_bytes)
                .bind(&a.mime_type)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "UPDATE document SET title = $2, content = $3, updated_at = $4 \
                     WHERE id = $1 \
                     RETURNING {DOCUMENT_COLUMNS}"
                ))
                .bind(id)
                .bind(&patch.title)
                .bind(&patch.content)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        let row = row.ok_or(Error::DocumentNotFound(id))?;
        Ok(document_from_row(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM document WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::DocumentNotFound(id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM document ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(document_from_row).collect())
    }
}

/// Convert a database row to a Document.
fn document_from_row(row: &sqlx::postgres::PgRow) -> Document {
    let id: Uuid = row.get("id");
    let attachment = attachment_from_columns(
        id,
        row.get("file_name"),
        row.get("storage_path"),
        row.get("public_url"),
        row.get("size_bytes"),
        row.get("mime_type"),
    );

    Document {
        id,
        title: row.get("title"),
        content: row.get("content"),
        attachment,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Materialize the attachment unit from its nullable columns.
///
/// All five columns must be present; anything less decodes as absent.
fn attachment_from_columns(
    id: Uuid,
    file_name: Option<String>,
    storage_path: Option<String>,
    public_url: Option<String>,
    size_bytes: Option<i64>,
    mime_type: Option<String>,
) -> Option<AttachmentRef> {
    let present = [
        file_name.is_some(),
        storage_path.is_some(),
        public_url.is_some(),
        size_bytes.is_some(),
        mime_type.is_some(),
    ]
    .into_iter()
    .filter(|p| *p)
    .count();

    match (file_name, storage_path, public_url, size_bytes, mime_type) {
        (Some(file_name), Some(storage_path), Some(public_url), Some(size_bytes), Some(mime_type)) => {
            Some(AttachmentRef {
                file_name,
                storage_path,
                public_url,
                size_bytes,
                mime_type,
            })
        }
        _ => {
            if present > 0 {
                warn!(
                    subsystem = "db",
                    component = "documents",
                    document_id = %id,
                    populated_columns = present,
                    "partially populated attachment unit; treating as absent"
                );
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_columns() -> (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<i64>,
        Option<String>,
    ) {
        (
            Some("a.pdf".to_string()),
            Some("docs/1700000000000_x1y2z3.pdf".to_string()),
            Some("https://files.test/docs/1700000000000_x1y2z3.pdf".to_string()),
            Some(1024),
            Some("application/pdf".to_string()),
        )
    }

    #[test]
    fn test_attachment_from_full_columns() {
        let (name, path, url, size, mime) = full_columns();
        let attachment =
            attachment_from_columns(Uuid::nil(), name, path, url, size, mime).unwrap();
        assert_eq!(attachment.file_name, "a.pdf");
        assert_eq!(attachment.size_bytes, 1024);
    }

    #[test]
    fn test_attachment_from_empty_columns() {
        assert!(attachment_from_columns(Uuid::nil(), None, None, None, None, None).is_none());
    }

    #[test]
    fn test_partial_attachment_decodes_as_absent() {
        let (name, path, _, size, mime) = full_columns();
        // Missing public_url: the unit is incomplete and must not surface.
        assert!(attachment_from_columns(Uuid::nil(), name, path, None, size, mime).is_none());
    }

    #[test]
    fn test_partial_attachment_single_column_decodes_as_absent() {
        let (name, ..) = full_columns();
        assert!(attachment_from_columns(Uuid::nil(), name, None, None, None, None).is_none());
    }
}
