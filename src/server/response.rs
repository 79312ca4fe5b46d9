use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Result as StoreResult;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn database_unavailable() -> Self {
        Self::internal("Database connection is not established")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Extension trait for converting store results to API errors.
/// The store error text is appended to `message`.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            ApiError::internal(format!("{message}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_store_error_carries_message() {
        let result: StoreResult<()> = Err(Error::AlreadyExists);
        let err = result.api_err("Failed to load drivers").unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to load drivers: already exists");
    }

    #[test]
    fn test_error_envelope_serialization() {
        let body = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(body, json!({ "data": null, "error": "boom" }));
    }
}
