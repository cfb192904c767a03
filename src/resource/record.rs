use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::{error_response, AppError};
use crate::extractors::JsonBody;
use crate::models::Entity;
use crate::service::RecordService;

type HandlerResult = Result<Response, (StatusCode, Json<Value>)>;

/// Routes for one record kind, mounted at the kind's collection path
pub fn routes<E: Entity>(service: RecordService<E>) -> Router {
    let base_path = E::KIND.path();

    Router::new()
        .route(base_path, get(list_records::<E>).post(create_record::<E>))
        .route(
            &format!("{}/{{id}}", base_path),
            get(get_record::<E>)
                .put(update_record::<E>)
                .delete(delete_record::<E>),
        )
        .with_state(service)
}

// Path ids are parsed here so a malformed id gets the JSON error body
fn parse_id<E: Entity>(raw: &str) -> Result<i64, (StatusCode, Json<Value>)> {
    raw.parse::<i64>().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid {} id: {}", E::KIND, raw),
        )
    })
}

fn record_location<E: Entity>(record: &E) -> Option<HeaderValue> {
    let id = record.id()?;
    HeaderValue::from_str(&format!("{}/{}", E::KIND.path(), id)).ok()
}

pub async fn create_record<E: Entity>(
    State(service): State<RecordService<E>>,
    JsonBody(payload): JsonBody<E>,
) -> HandlerResult {
    let created = service
        .create(payload)
        .await
        .map_err(|e| e.to_response())?;

    let location = record_location(&created).ok_or_else(|| {
        AppError::Internal(format!("Created {} missing id", E::KIND)).to_response()
    })?;

    let mut response = (StatusCode::CREATED, Json(created)).into_response();
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

pub async fn list_records<E: Entity>(State(service): State<RecordService<E>>) -> HandlerResult {
    let records = service.list().await.map_err(|e| e.to_response())?;
    Ok(Json(records).into_response())
}

pub async fn get_record<E: Entity>(
    State(service): State<RecordService<E>>,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let id = parse_id::<E>(&raw_id)?;

    match service.get_by_id(id).await.map_err(|e| e.to_response())? {
        Some(record) => Ok(Json(record).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn update_record<E: Entity>(
    State(service): State<RecordService<E>>,
    Path(raw_id): Path<String>,
    JsonBody(payload): JsonBody<E>,
) -> HandlerResult {
    let id = parse_id::<E>(&raw_id)?;

    match service
        .update_by_id(id, payload)
        .await
        .map_err(|e| e.to_response())?
    {
        Some(updated) => Ok(Json(updated).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn delete_record<E: Entity>(
    State(service): State<RecordService<E>>,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let id = parse_id::<E>(&raw_id)?;

    service.delete_by_id(id).await.map_err(|e| e.to_response())?;

    Ok((StatusCode::OK, E::KIND.deleted_message()).into_response())
}
