//! # arca-db
//!
//! PostgreSQL metadata layer for arca.
//!
//! This crate provides:
//! - Connection pool management
//! - The document repository implementation
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use arca_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/arca").await?;
//!     db.migrate().await?;
//!
//!     let docs = db.documents.list().await?;
//!     println!("{} documents", docs.len());
//!     Ok(())
//! }
//! ```

pub mod documents;
pub mod pool;

pub use documents::PgDocumentRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

use arca_core::{DocumentRepository, Error, Result};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Document repository for CRUD operations.
    pub documents: std::sync::Arc<PgDocumentRepository>,
}

impl Database {
    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_config(database_url, PoolConfig::default()).await
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self {
            documents: std::sync::Arc::new(PgDocumentRepository::new(pool.clone())),
            pool,
        })
    }

    /// Run pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Repository handle as a trait object for injection into the
    /// lifecycle manager.
    pub fn document_repository(&self) -> std::sync::Arc<dyn DocumentRepository> {
        self.documents.clone()
    }
}
