use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use std::marker::PhantomData;

use super::super::record_write::{
    map_database_error, map_read_error, PreparedRecord, RecordRow, RecordWriteProcessor,
    RECORD_COLUMNS,
};
use crate::backend::Repository;
use crate::error::{AppError, AppResult};
use crate::models::Entity;

/// PostgreSQL-specific implementation of Repository
pub struct PostgresRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PostgresRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        E::KIND.table()
    }

    async fn insert_row<'c, X>(executor: X, table: &str, data: &PreparedRecord) -> Result<i64, sqlx::Error>
    where
        X: sqlx::Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO {} (first_name, last_name, email, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) RETURNING id",
            table
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(&data.details.first_name)
            .bind(&data.details.last_name)
            .bind(&data.details.email)
            .bind(data.timestamp)
            .bind(data.timestamp)
            .fetch_one(executor)
            .await
    }

    /// Overwrite (or create) the row with an explicit id.
    ///
    /// The id sequence is advanced past explicit ids so later generated ids
    /// cannot collide with them.
    async fn upsert_row(&self, id: i64, data: &PreparedRecord) -> Result<(), sqlx::Error> {
        let table = self.table();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO {} (id, first_name, last_name, email, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT (id) DO UPDATE SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, \
             email = EXCLUDED.email, updated_at = EXCLUDED.updated_at",
            table
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(&data.details.first_name)
            .bind(&data.details.last_name)
            .bind(&data.details.email)
            .bind(data.timestamp)
            .execute(&mut *tx)
            .await?;

        let sequence_sql = format!(
            "SELECT setval(pg_get_serial_sequence('{}', 'id'), GREATEST((SELECT MAX(id) FROM {}), 1))",
            table, table
        );
        sqlx::query(&sequence_sql).execute(&mut *tx).await?;

        tx.commit().await
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PostgresRepository<E> {
    async fn find_all(&self) -> AppResult<Vec<E>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id ASC", RECORD_COLUMNS, self.table());

        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "list"))?;

        Ok(rows.into_iter().map(RecordRow::into_entity).collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", RECORD_COLUMNS, self.table());

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "read"))?;

        Ok(row.map(RecordRow::into_entity))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1 ORDER BY id ASC LIMIT 1",
            RECORD_COLUMNS,
            self.table()
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "search"))?;

        Ok(row.map(RecordRow::into_entity))
    }

    async fn find_by_name(&self, first_name: &str, last_name: &str) -> AppResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE first_name = $1 AND last_name = $2 ORDER BY id ASC LIMIT 1",
            RECORD_COLUMNS,
            self.table()
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(first_name)
            .bind(last_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "search"))?;

        Ok(row.map(RecordRow::into_entity))
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", self.table());

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "read"))
    }

    async fn save(&self, record: &E) -> AppResult<E> {
        let data = RecordWriteProcessor::prepare(record);

        let id = match data.id {
            Some(id) => {
                self.upsert_row(id, &data)
                    .await
                    .map_err(|e| map_database_error(e, E::KIND, &data.details.email))?;
                id
            }
            None => Self::insert_row(&self.pool, self.table(), &data)
                .await
                .map_err(|e| map_database_error(e, E::KIND, &data.details.email))?,
        };

        Ok(RecordWriteProcessor::finalize(id, data))
    }

    async fn update_existing(&self, record: &E) -> AppResult<Option<E>> {
        let data = RecordWriteProcessor::prepare(record);
        let Some(id) = data.id else {
            return Ok(None);
        };

        let sql = format!(
            "UPDATE {} SET first_name = $1, last_name = $2, email = $3, updated_at = $4 WHERE id = $5",
            self.table()
        );

        let result = sqlx::query(&sql)
            .bind(&data.details.first_name)
            .bind(&data.details.last_name)
            .bind(&data.details.email)
            .bind(data.timestamp)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, E::KIND, &data.details.email))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(RecordWriteProcessor::finalize(id, data)))
    }

    async fn insert_unique(&self, record: &E) -> AppResult<E> {
        let data = RecordWriteProcessor::prepare(record);
        let email = data.details.email.clone();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let check_sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE email = $1)", self.table());
        let taken: bool = sqlx::query_scalar(&check_sql)
            .bind(&email)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to check duplicate email: {}", e)))?;

        if taken {
            return Err(AppError::Conflict(
                RecordWriteProcessor::duplicate_email_message(E::KIND, &email),
            ));
        }

        // A concurrent insert that passed the check still hits the UNIQUE constraint
        let id = Self::insert_row(&mut *tx, self.table(), &data)
            .await
            .map_err(|e| map_database_error(e, E::KIND, &email))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(RecordWriteProcessor::finalize(id, data))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table());

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete {}: {}", E::KIND, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table());

        sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "count"))
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let sql = format!("DELETE FROM {}", self.table());

        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear {}: {}", self.table(), e)))?;

        Ok(result.rows_affected())
    }
}
