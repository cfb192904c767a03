use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::super::config::DatabaseBackendConfig;
use super::repository_impl::PostgresRepository;
use crate::backend::{Backend, Repository};
use crate::error::{AppError, AppResult};
use crate::models::{Employee, Student};

/// PostgreSQL database backend implementation
pub struct PostgresBackend {
    pool: PgPool,
    employees: Arc<PostgresRepository<Employee>>,
    students: Arc<PostgresRepository<Student>>,
}

impl PostgresBackend {
    /// Create a new PostgreSQL backend instance
    pub fn new(pool: PgPool) -> Self {
        Self {
            employees: Arc::new(PostgresRepository::new(pool.clone())),
            students: Arc::new(PostgresRepository::new(pool.clone())),
            pool,
        }
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        // Validate configuration
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        // Create connection pool
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.connection_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

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
