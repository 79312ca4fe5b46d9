use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::helpers::{TokenValidationError, extract_bearer_token, validate_token};
use crate::server::AppState;
use crate::types::User;

/// Extractor that requires a valid bearer token naming an active user.
pub struct CurrentUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidCredentials,
    UserNotFound,
    InactiveUser,
    DatabaseUnavailable,
    InternalError,
}

impl From<TokenValidationError> for AuthError {
    fn from(e: TokenValidationError) -> Self {
        match e {
            // a non-bearer scheme counts as no credentials at all
            TokenValidationError::InvalidScheme => AuthError::MissingAuth,
            TokenValidationError::InvalidToken => AuthError::InvalidCredentials,
            TokenValidationError::TokenExpired => {
                tracing::debug!("rejected expired token");
                AuthError::InvalidCredentials
            }
            TokenValidationError::UserNotFound => AuthError::UserNotFound,
            TokenValidationError::InactiveUser => AuthError::InactiveUser,
            TokenValidationError::DatabaseUnavailable => AuthError::DatabaseUnavailable,
            TokenValidationError::InternalError => AuthError::InternalError,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Not authenticated"),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid authentication credentials",
            ),
            AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found"),
            AuthError::InactiveUser => (StatusCode::BAD_REQUEST, "Inactive user"),
            AuthError::DatabaseUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection is not established",
            ),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = extract_bearer_token(auth_header)?.ok_or(AuthError::MissingAuth)?;
        let user = validate_token(state, &raw_token)?;

        Ok(CurrentUser(user))
    }
}
