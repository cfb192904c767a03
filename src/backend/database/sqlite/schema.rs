use crate::error::{AppError, AppResult};
use crate::models::EntityKind;
use sqlx::SqlitePool;

/// Initialize the record tables for SQLite
///
/// Creates one table per record kind with a store-generated id and a
/// UNIQUE email column, plus a name index.
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    for kind in EntityKind::ALL {
        create_record_table(pool, kind).await?;
    }

    create_indexes(pool).await?;

    Ok(())
}

async fn create_record_table(pool: &SqlitePool, kind: EntityKind) -> AppResult<()> {
    let table = kind.table();
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        table
    );

    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create {} table: {}", table, e)))?;

    Ok(())
}

/// Create lookup indexes for record tables
async fn create_indexes(pool: &SqlitePool) -> AppResult<()> {
    let indexes: Vec<String> = EntityKind::ALL
        .iter()
        .flat_map(|kind| {
            let table = kind.table();
            vec![
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{}_name ON {} (first_name, last_name)",
                    table, table
                ),
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{}_created_at ON {} (created_at)",
                    table, table
                ),
            ]
        })
        .collect();

    for sql in &indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
