use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool};
use std::marker::PhantomData;

use super::super::record_write::{
    map_database_error, map_read_error, PreparedRecord, RecordRow, RecordWriteProcessor,
    RECORD_COLUMNS,
};
use crate::backend::Repository;
use crate::error::{AppError, AppResult};
use crate::models::Entity;

/// SQLite-specific implementation of Repository
///
/// One instance per record type; the table comes from the entity kind.
pub struct SqliteRepository<E> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SqliteRepository<E> {
    pub fn new(pool: SqlitePool) -> Self {
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
        X: sqlx::Executor<'c, Database = Sqlite>,
    {
        let sql = format!(
            "INSERT INTO {} (first_name, last_name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
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

    async fn upsert_row(&self, id: i64, data: &PreparedRecord) -> Result<(), sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (id, first_name, last_name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(id) DO UPDATE SET first_name = excluded.first_name, last_name = excluded.last_name, \
             email = excluded.email, updated_at = excluded.updated_at",
            self.table()
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(&data.details.first_name)
            .bind(&data.details.last_name)
            .bind(&data.details.email)
            .bind(data.timestamp)
            .bind(data.timestamp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for SqliteRepository<E> {
    async fn find_all(&self) -> AppResult<Vec<E>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id ASC", RECORD_COLUMNS, self.table());

        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "list"))?;

        Ok(rows.into_iter().map(RecordRow::into_entity).collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", RECORD_COLUMNS, self.table());

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "read"))?;

        Ok(row.map(RecordRow::into_entity))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = ?1 ORDER BY id ASC LIMIT 1",
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
            "SELECT {} FROM {} WHERE first_name = ?1 AND last_name = ?2 ORDER BY id ASC LIMIT 1",
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
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", self.table());

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_error(e, E::KIND, "read"))?;

        Ok(count > 0)
    }

    async fn save(&self, record: &E) -> AppResult<E> {
        let data = RecordWriteProcessor::prepare(record);

        match data.id {
            Some(id) => {
                self.upsert_row(id, &data)
                    .await
                    .map_err(|e| map_database_error(e, E::KIND, &data.details.email))?;
                Ok(RecordWriteProcessor::finalize(id, data))
            }
            None => {
                let id = Self::insert_row(&self.pool, self.table(), &data)
                    .await
                    .map_err(|e| map_database_error(e, E::KIND, &data.details.email))?;
                Ok(RecordWriteProcessor::finalize(id, data))
            }
        }
    }

    async fn update_existing(&self, record: &E) -> AppResult<Option<E>> {
        let data = RecordWriteProcessor::prepare(record);
        let Some(id) = data.id else {
            return Ok(None);
        };

        let sql = format!(
            "UPDATE {} SET first_name = ?1, last_name = ?2, email = ?3, updated_at = ?4 WHERE id = ?5",
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

        // Take the write lock up front; a deferred transaction upgrading from a
        // read lock fails with SQLITE_BUSY instead of waiting on busy_timeout
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let check_sql = format!("SELECT COUNT(*) FROM {} WHERE email = ?1", self.table());
        let existing: i64 = sqlx::query_scalar(&check_sql)
            .bind(&email)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to check duplicate email: {}", e)))?;

        if existing > 0 {
            return Err(AppError::Conflict(
                RecordWriteProcessor::duplicate_email_message(E::KIND, &email),
            ));
        }

        let id = Self::insert_row(&mut *tx, self.table(), &data)
            .await
            .map_err(|e| map_database_error(e, E::KIND, &email))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(RecordWriteProcessor::finalize(id, data))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table());

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Student};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        super::super::schema::init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_find_by_id() {
        let repo = SqliteRepository::<Employee>::new(create_test_pool().await);

        let saved = repo
            .save(&Employee::new("Ramesh", "Fegade", "ramesh@gmail.com"))
            .await
            .unwrap();

        let id = saved.id.unwrap();
        assert!(id > 0);

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert!(repo.exists_by_id(id).await.unwrap());
        assert!(repo.find_by_id(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_in_insertion_order() {
        let repo = SqliteRepository::<Employee>::new(create_test_pool().await);
        for (first, email) in [
            ("Ramesh", "ramesh@gmail.com"),
            ("Arun", "arun@gmail.com"),
            ("Pankaj", "pankaj@gmail.com"),
        ] {
            repo.save(&Employee::new(first, "X", email)).await.unwrap();
        }

        let all = repo.find_all().await.unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.details.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ramesh", "Arun", "Pankaj"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_save_with_id_overwrites_row() {
        let repo = SqliteRepository::<Student>::new(create_test_pool().await);
        let mut saved = repo
            .save(&Student::new("Arun", "Prajapati", "arun@gmail.com"))
            .await
            .unwrap();

        saved.details.email = "arun.p@gmail.com".to_string();
        let updated = repo.save(&saved).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(repo.count().await.unwrap(), 1);
        let reloaded = repo.find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(reloaded.details.email, "arun.p@gmail.com");
    }

    #[tokio::test]
    async fn test_find_by_email_and_name() {
        let repo = SqliteRepository::<Student>::new(create_test_pool().await);
        repo.save(&Student::new("Arun", "Prajapati", "arun@gmail.com"))
            .await
            .unwrap();

        let by_email = repo.find_by_email("arun@gmail.com").await.unwrap();
        assert_eq!(by_email.unwrap().details.last_name, "Prajapati");
        assert!(repo.find_by_email("nobody@gmail.com").await.unwrap().is_none());

        let by_name = repo.find_by_name("Arun", "Prajapati").await.unwrap();
        assert!(by_name.is_some());
        assert!(repo.find_by_name("Arun", "Other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_unique_rejects_duplicate_email() {
        let repo = SqliteRepository::<Employee>::new(create_test_pool().await);
        let employee = Employee::new("Ramesh", "Fegade", "ramesh@gmail.com");

        repo.insert_unique(&employee).await.unwrap();
        let err = repo.insert_unique(&employee).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("ramesh@gmail.com")));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_conflicting_email_maps_to_conflict() {
        let repo = SqliteRepository::<Employee>::new(create_test_pool().await);
        repo.save(&Employee::new("A", "A", "a@example.com")).await.unwrap();
        let second = repo.save(&Employee::new("B", "B", "b@example.com")).await.unwrap();

        let mut clash = second.clone();
        clash.details.email = "a@example.com".to_string();
        let err = repo.save(&clash).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = SqliteRepository::<Employee>::new(create_test_pool().await);
        let saved = repo
            .save(&Employee::new("Ramesh", "Fegade", "ramesh@gmail.com"))
            .await
            .unwrap();
        let id = saved.id.unwrap();

        assert!(repo.delete_by_id(id).await.unwrap());
        assert!(!repo.delete_by_id(id).await.unwrap());
        assert!(!repo.exists_by_id(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let pool = create_test_pool().await;
        let employees = SqliteRepository::<Employee>::new(pool.clone());
        let students = SqliteRepository::<Student>::new(pool);

        employees
            .save(&Employee::new("Ramesh", "Fegade", "shared@gmail.com"))
            .await
            .unwrap();
        students
            .insert_unique(&Student::new("Ramesh", "Fegade", "shared@gmail.com"))
            .await
            .unwrap();

        assert_eq!(employees.delete_all().await.unwrap(), 1);
        assert_eq!(students.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_existing_never_inserts() {
        let repo = SqliteRepository::<Employee>::new(create_test_pool().await);
        let saved = repo
            .save(&Employee::new("Ramesh", "Suryavanshi", "ramv@gmail.com"))
            .await
            .unwrap();

        let mut changed = saved.clone();
        changed.details = crate::models::PersonDetails::new("Rakesh", "Prajapati", "rakesh@gmail.com");
        let updated = repo.update_existing(&changed).await.unwrap().unwrap();
        assert_eq!(repo.find_by_id(saved.id.unwrap()).await.unwrap(), Some(updated));

        // Once the row is gone the write is a no-op
        repo.delete_by_id(saved.id.unwrap()).await.unwrap();
        assert!(repo.update_existing(&changed).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);

        assert!(repo
            .update_existing(&Employee::new("No", "Id", "noid@gmail.com"))
            .await
            .unwrap()
            .is_none());
    }
}
