use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::super::config::DatabaseBackendConfig;
use super::repository_impl::SqliteRepository;
use crate::backend::{Backend, Repository};
use crate::error::{AppError, AppResult};
use crate::models::{Employee, Student};

/// SQLite database backend implementation
///
/// Used for zero-config runs (in-memory) and single-node deployments
/// backed by a database file.
pub struct SqliteBackend {
    pool: SqlitePool,
    employees: Arc<SqliteRepository<Employee>>,
    students: Arc<SqliteRepository<Student>>,
}

impl SqliteBackend {
    /// Create a new SQLite backend instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            employees: Arc::new(SqliteRepository::new(pool.clone())),
            students: Arc::new(SqliteRepository::new(pool.clone())),
            pool,
        }
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let options = SqliteConnectOptions::from_str(&config.connection_url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout));

        // An in-memory database lives only as long as its connection
        if config.is_memory_database() {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_schema(&self.pool).await
    }

    fn employees(&self) -> Arc<dyn Repository<Employee>> {
        self.employees.clone()
    }

    fn students(&self) -> Arc<dyn Repository<Student>> {
        self.students.clone()
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}
