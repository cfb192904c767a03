use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::backend::{Backend, BackendFactory};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::logging::logging_middleware;
use crate::resource;
use crate::service::RecordService;

/// Connect the configured backend and make sure its tables exist
pub async fn setup_backend(config: &AppConfig) -> AppResult<Arc<dyn Backend>> {
    let backend_config = config
        .database
        .to_backend_config()
        .map_err(AppError::Configuration)?;

    tracing::info!(
        database = %config.database.db_type,
        max_connections = backend_config.max_connections,
        "connecting to database"
    );

    let backend = BackendFactory::create(&backend_config).await?;
    backend.init_schema().await?;

    tracing::info!("database schema ready");
    Ok(backend)
}

/// Build the application router on top of a connected backend
///
/// Repositories are injected into services, services into the per-kind routers.
pub fn build_router(backend: Arc<dyn Backend>, config: &AppConfig) -> Router {
    let employees = RecordService::new(backend.employees());
    let students = RecordService::new(backend.students());

    let app = Router::new()
        .merge(resource::routes(employees))
        .merge(resource::routes(students))
        .merge(
            Router::new()
                .route("/health", get(resource::health))
                .with_state(backend),
        );

    if config.logging.access_log {
        app.layer(middleware::from_fn(logging_middleware))
    } else {
        app
    }
}
