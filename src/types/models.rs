use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub hashed_password: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A user that has not been persisted yet; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
    pub email: String,
}
