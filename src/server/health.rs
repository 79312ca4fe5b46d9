use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::{DbCheckResponse, StatusResponse};
use crate::server::response::ApiError;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        message: "Welcome to the API!".to_string(),
        database_connected: state.store.is_some(),
    })
}

pub async fn test_db(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = state
        .store()?
        .ping()
        .map_err(|e| ApiError::internal(format!("Database query failed: {e}")))?;

    Ok::<_, ApiError>(Json(DbCheckResponse {
        message: "Database connection is successful!".to_string(),
        result,
    }))
}
