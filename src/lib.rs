pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod resource;
pub mod schema;
pub mod service;
pub mod startup;

// Re-export commonly used types for easier access
pub use models::{Employee, Entity, EntityKind, PersonDetails, Student};
pub use service::RecordService;
