use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::errors::CoreError;

/// HTTP-facing wrapper for `CoreError`. Validation failures carry the
/// field -> message map so callers can attribute each problem to a form field.
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            CoreError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "validation failed", "fields": fields }),
            ),
            CoreError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{} {} not found", entity, id) }),
            ),
            CoreError::Conflict(message) => {
                (StatusCode::CONFLICT, json!({ "error": message }))
            }
            CoreError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }
            CoreError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, json!({ "error": message }))
            }
            CoreError::Database(err) => {
                error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
