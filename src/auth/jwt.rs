use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated user.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued at timestamp (seconds since epoch).
    pub iat: i64,
}

/// HS256 signing and verification keys derived from the shared secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token for `username` expiring after the configured TTL.
    pub fn issue(&self, username: &str) -> Result<String> {
        self.issue_at(username, Utc::now())
    }

    /// Issues a token as if it had been created at `issued_at`.
    pub fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Config("token lifetime overflows the clock".to_string()))?;

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Config(format!("failed to sign token: {e}")))
    }

    /// Checks signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::InvalidToken,
            })
    }
}
