//! Database abstraction layer for the roster server
//!
//! This module provides a unified interface for record persistence across
//! different database backends (PostgreSQL, SQLite) while keeping the
//! engine-specific SQL in each backend's own module.
//!
//! # Architecture
//!
//! ```text
//! Common logic (record_write.rs: preparation, row mapping, error mapping)
//!     ↓
//! Database-specific implementations
//!     ├── postgres/ (PostgreSQL-specific code)
//!     └── sqlite/   (SQLite-specific code)
//! ```

pub mod config;
pub mod postgres;
pub mod record_write;
pub mod sqlite;

// Re-export key types for convenience
pub use config::DatabaseBackendConfig;

pub use record_write::{
    map_database_error, map_read_error, PreparedRecord, RecordRow, RecordWriteProcessor,
};

pub use postgres::{PostgresBackend, PostgresRepository};
pub use sqlite::{SqliteBackend, SqliteRepository};
