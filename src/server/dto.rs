use serde::{Deserialize, Serialize};

/// OAuth2 password-flow form posted to `/token`.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub database_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct DbCheckResponse {
    pub message: String,
    pub result: i64,
}

#[derive(Debug, Deserialize)]
pub struct DriverRequest {
    pub forename: String,
    pub surname: String,
}

#[derive(Debug, Deserialize)]
pub struct PosRequest {
    pub year: i64,
    pub rank: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConstructorRequest {
    pub constru: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VictoryParams {
    #[serde(default)]
    pub limit: Option<u32>,
}
