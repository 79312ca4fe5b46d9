//! # Pitwall
//!
//! Formula 1 statistics: a CSV loader for the normalized source database,
//! a star-schema warehouse build, and a JWT-protected REST API over the
//! source data. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! pitwall = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pitwall::auth::JwtKeys;
//! use pitwall::server::{AppState, create_router};
//! use pitwall::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/f1.db").unwrap();
//! store.initialize().unwrap();
//!
//! let jwt = JwtKeys::new("change-me", chrono::Duration::minutes(30));
//! let state = Arc::new(AppState::new(Some(Arc::new(store)), jwt));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): builds the `pitwall` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod etl;
pub mod server;
pub mod store;
pub mod types;
