use crate::error::AppResult;
use crate::models::{Employee, Entity, Student};
use async_trait::async_trait;
use std::sync::Arc;

pub mod database;

/// Supported database backend types
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    /// Parse the `type` value used in configuration files
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Some(DatabaseType::PostgreSQL),
            "sqlite" => Some(DatabaseType::SQLite),
            _ => None,
        }
    }
}

/// Persistence gateway for one record type.
///
/// Every operation is a direct parameterized statement against the record's
/// table; nothing is cached. Absence is reported through `Option`/`bool`,
/// never as an error.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// All records ordered by insertion (ascending id)
    async fn find_all(&self) -> AppResult<Vec<E>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<E>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<E>>;

    /// First record (lowest id) matching both names exactly
    async fn find_by_name(&self, first_name: &str, last_name: &str) -> AppResult<Option<E>>;

    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// Insert when the record has no id, otherwise overwrite the row with that id.
    /// An id with no stored row is inserted as given.
    async fn save(&self, record: &E) -> AppResult<E>;

    /// Overwrite the existing row with the record's id.
    /// Returns `None` (and writes nothing) when that row does not exist.
    async fn update_existing(&self, record: &E) -> AppResult<Option<E>>;

    /// Email check and insert in a single transaction; `Conflict` when taken
    async fn insert_unique(&self, record: &E) -> AppResult<E>;

    /// Returns whether a row was removed
    async fn delete_by_id(&self, id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<i64>;

    async fn delete_all(&self) -> AppResult<u64>;
}

/// Core backend abstraction
///
/// A backend owns the connection pool and hands out one repository per
/// record type. Each implementation (PostgreSQL, SQLite) implements this trait.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &crate::backend::database::DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create the record tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;

    fn employees(&self) -> Arc<dyn Repository<Employee>>;

    fn students(&self) -> Arc<dyn Repository<Student>>;

    /// Clean up resources when storage is no longer needed
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Arc<dyn Backend>> {
        let backend = Self::create_backend(config).await?;
        Ok(Arc::from(backend))
    }

    /// Create a backend based on configuration (returns Box)
    pub async fn create_backend(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Box<dyn Backend>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let backend =
                    crate::backend::database::postgres::PostgresBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
            DatabaseType::SQLite => {
                let backend =
                    crate::backend::database::sqlite::SqliteBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
