use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    response::IntoResponse,
};

use crate::auth::CurrentUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CreateUserRequest, MessageResponse, TokenForm, TokenResponse};
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::{validate_email, validate_password, validate_username};
use crate::types::NewUser;

const INCORRECT_CREDENTIALS: &str = "Incorrect username or password";

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TokenForm>,
) -> impl IntoResponse {
    let store = state.store()?;

    let user = store
        .get_user_by_username(&form.username)
        .api_err("Failed to load user")?
        .ok_or_else(|| ApiError::bad_request(INCORRECT_CREDENTIALS))?;

    let valid = state
        .passwords
        .verify(&form.password, &user.hashed_password)
        .unwrap_or_else(|e| {
            tracing::warn!("Stored hash for '{}' is unreadable: {e}", user.username);
            false
        });

    if !valid {
        return Err(ApiError::bad_request(INCORRECT_CREDENTIALS));
    }

    let token = state
        .jwt
        .issue(&user.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(username = %user.username, "issued access token");

    Ok::<_, ApiError>(Json(TokenResponse::bearer(token)))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let store = state.store()?;

    if store
        .get_user_by_username(&req.username)
        .api_err("Failed to check existing user")?
        .is_some()
    {
        return Err(ApiError::bad_request("Username already registered"));
    }

    if store
        .get_user_by_email(&req.email)
        .api_err("Failed to check existing user")?
        .is_some()
    {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let hashed_password = state
        .passwords
        .hash(&req.password)
        .map_err(|e| ApiError::internal(format!("Internal Server Error: {e}")))?;

    let new_user = NewUser {
        username: req.username,
        hashed_password,
        email: req.email,
    };

    match store.create_user(&new_user) {
        Ok(user) => {
            tracing::info!(username = %user.username, "created user");
        }
        // lost a race with a concurrent signup
        Err(Error::AlreadyExists) => {
            return Err(ApiError::bad_request("Username already registered"));
        }
        Err(e) => {
            return Err(ApiError::internal(format!("Internal Server Error: {e}")));
        }
    }

    Ok::<_, ApiError>(Json(MessageResponse::new("User created successfully")))
}

pub async fn protected(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(MessageResponse::new(format!("Hello, {}", user.username)))
}
