//! Runtime configuration.
//!
//! Values come from an optional TOML file; command-line flags override
//! individual fields afterwards. The JWT secret can also be supplied through
//! the `PITWALL_JWT_SECRET` environment variable.

mod server;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use server::ServerConfig;

use crate::error::{Error, Result};

pub const JWT_SECRET_ENV: &str = "PITWALL_JWT_SECRET";

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
/// One year.
const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub etl: EtlConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Normalized source schema, queried by the API.
    pub path: PathBuf,
    /// Star-schema warehouse built from the source database.
    pub warehouse_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/f1.db"),
            warehouse_path: PathBuf::from("./data/f1_dw.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub csv_dir: PathBuf,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("./csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

impl Config {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                toml::from_str::<Self>(&content).map_err(|e| {
                    Error::Config(format!("failed to parse {}: {e}", path.display()))
                })?
            }
            None => Self::default(),
        };

        if config.auth.jwt_secret.is_none() {
            config.auth.jwt_secret = std::env::var(JWT_SECRET_ENV)
                .ok()
                .filter(|s| !s.trim().is_empty());
        }

        Ok(config)
    }

    /// Returns the signing secret, failing when none was configured.
    pub fn jwt_secret(&self) -> Result<&str> {
        match self.auth.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(Error::Config(format!(
                "no JWT secret configured; set [auth] jwt_secret or {JWT_SECRET_ENV}"
            ))),
        }
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        if self.auth.token_ttl_minutes <= 0 {
            return Err(Error::Config(
                "token_ttl_minutes must be positive".to_string(),
            ));
        }
        if self.auth.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(Error::Config(format!(
                "token_ttl_minutes cannot exceed {MAX_TOKEN_TTL_MINUTES}"
            )));
        }
        Ok(chrono::Duration::minutes(self.auth.token_ttl_minutes))
    }
}
