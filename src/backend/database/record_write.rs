use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{Entity, EntityKind, PersonDetails};

/// Column list selected by every read query
pub const RECORD_COLUMNS: &str = "id, first_name, last_name, email";

/// One row of a record table as read from either engine
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RecordRow {
    pub fn into_entity<E: Entity>(self) -> E {
        E::from_parts(
            Some(self.id),
            PersonDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
            },
        )
    }
}

/// Record data normalized and stamped, ready for an INSERT or UPDATE
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub id: Option<i64>,
    pub details: PersonDetails,
    pub timestamp: DateTime<Utc>,
}

/// Shared logic for record writes
pub struct RecordWriteProcessor;

impl RecordWriteProcessor {
    /// Prepare a record for writing
    ///
    /// Text fields are trimmed; the timestamp feeds `created_at` on insert
    /// and `updated_at` on every write.
    pub fn prepare<E: Entity>(record: &E) -> PreparedRecord {
        PreparedRecord {
            id: record.id(),
            details: record.details().normalized(),
            timestamp: Utc::now(),
        }
    }

    /// Build the stored record once the database has settled its id
    pub fn finalize<E: Entity>(id: i64, data: PreparedRecord) -> E {
        E::from_parts(Some(id), data.details)
    }

    pub fn duplicate_email_message(kind: EntityKind, email: &str) -> String {
        format!("{} already exists with given email {}", kind, email)
    }
}

/// Map database errors to AppError using common logic
pub fn map_database_error(error: sqlx::Error, kind: EntityKind, email: &str) -> AppError {
    let is_unique_violation = error
        .as_database_error()
        .map(|db_error| db_error.is_unique_violation())
        .unwrap_or(false);

    if is_unique_violation {
        AppError::Conflict(RecordWriteProcessor::duplicate_email_message(kind, email))
    } else {
        AppError::Database(format!("Failed to write {}: {}", kind, error))
    }
}

/// Map read-side database errors
pub fn map_read_error(error: sqlx::Error, kind: EntityKind, operation: &str) -> AppError {
    AppError::Database(format!("Failed to {} {}: {}", operation, kind.table(), error))
}
