//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error type. The body carries a single `detail` string.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

impl From<ngoma_core::ResolveError> for ApiError {
    fn from(err: ngoma_core::ResolveError) -> Self {
        ApiError::unprocessable(err.to_string())
    }
}

impl From<ngoma_core::Error> for ApiError {
    fn from(err: ngoma_core::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}
