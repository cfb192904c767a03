use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::error_response;

/// JSON body extractor whose rejections use the application's JSON error shape
///
/// Accepts `application/json` and any `application/*+json` media type.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers();

        if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
            let content_type_str = content_type
                .to_str()
                .map_err(|_| JsonBodyRejection::InvalidContentType)?;

            // Extract the media type without parameters (e.g., charset)
            let media_type = content_type_str
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_lowercase();

            if media_type != "application/json"
                && !(media_type.starts_with("application/") && media_type.ends_with("+json"))
            {
                return Err(JsonBodyRejection::InvalidContentType);
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(JsonBodyRejection::JsonRejection(rejection)),
        }
    }
}

pub enum JsonBodyRejection {
    InvalidContentType,
    JsonRejection(JsonRejection),
}

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        match self {
            JsonBodyRejection::InvalidContentType => error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Content-Type must be application/json",
            )
            .into_response(),
            JsonBodyRejection::JsonRejection(rejection) => {
                // Syntax and data errors are client errors; keep axum's status otherwise
                let status = match rejection {
                    JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ref other => other.status(),
                };
                error_response(status, &format!("Invalid JSON: {}", rejection.body_text()))
                    .into_response()
            }
        }
    }
}
