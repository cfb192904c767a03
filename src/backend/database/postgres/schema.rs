use crate::error::{AppError, AppResult};
use crate::models::EntityKind;
use sqlx::PgPool;

/// Initialize the record tables for PostgreSQL
///
/// Creates one table per record kind with a BIGSERIAL id and a UNIQUE
/// email column, plus a name index.
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
    for kind in EntityKind::ALL {
        let table = kind.table();
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            table
        );

        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create {} table: {}", table, e)))?;

        let index_sql = format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_name ON {} (first_name, last_name)",
            table, table
        );

        sqlx::query(&index_sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
