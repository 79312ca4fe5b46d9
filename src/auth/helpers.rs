use std::sync::Arc;

use crate::error::Error;
use crate::server::AppState;
use crate::types::User;

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    UserNotFound,
    InactiveUser,
    DatabaseUnavailable,
    InternalError,
}

/// Extracts the token from an `Authorization: Bearer` header.
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is not Bearer.
pub fn extract_bearer_token(
    auth_header: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    match auth_header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Some(_) => Err(TokenValidationError::InvalidToken),
            None => Err(TokenValidationError::InvalidScheme),
        },
        None => Ok(None),
    }
}

/// Verifies a raw JWT and loads the user named by its subject.
pub fn validate_token(
    state: &Arc<AppState>,
    raw_token: &str,
) -> Result<User, TokenValidationError> {
    let claims = state.jwt.verify(raw_token).map_err(|e| match e {
        Error::TokenExpired => TokenValidationError::TokenExpired,
        _ => TokenValidationError::InvalidToken,
    })?;

    let store = state
        .store
        .as_ref()
        .ok_or(TokenValidationError::DatabaseUnavailable)?;

    let user = store
        .get_user_by_username(&claims.sub)
        .map_err(|e| {
            tracing::error!("Failed to load user '{}': {e}", claims.sub);
            TokenValidationError::InternalError
        })?
        .ok_or(TokenValidationError::UserNotFound)?;

    if !user.is_active {
        return Err(TokenValidationError::InactiveUser);
    }

    Ok(user)
}
