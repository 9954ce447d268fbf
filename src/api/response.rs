use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::{AnalyticsError, QueryError, ValidationError};

/// Error half of every handler's return type.
///
/// The client sees the validation reason, or only the failing operation name
/// for storage failures; the underlying cause is logged by the repository.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    Failed(&'static str),
    Cancelled,
    DeadlineExceeded,
}

impl ApiError {
    pub fn from_analytics(operation: &'static str, err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Validation(err) => err.into(),
            AnalyticsError::Query(QueryError::Cancelled) => ApiError::Cancelled,
            AnalyticsError::Query(QueryError::DeadlineExceeded) => ApiError::DeadlineExceeded,
            AnalyticsError::Query(_) => ApiError::Failed(operation),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(reason) => json!({ "error": reason }),
            ApiError::Unauthorized(detail) => json!({ "detail": detail }),
            ApiError::Failed(operation) => json!({ "error": format!("{} failed", operation) }),
            ApiError::Cancelled => json!({ "error": "request cancelled" }),
            ApiError::DeadlineExceeded => json!({ "error": "request timed out" }),
        };
        (status, Json(body)).into_response()
    }
}
