//! JWT Token Handler
//! Mission: Generate and validate JWT tokens securely

use crate::auth::models::{Claims, Role};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

pub const DEFAULT_EXPIRE_MINUTES: i64 = 30;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expire_minutes: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and token lifetime.
    pub fn new(secret: String, expire_minutes: i64) -> Self {
        Self {
            secret,
            expire_minutes,
        }
    }

    /// Generate a signed token asserting a username and role.
    ///
    /// Returns the token and its lifetime in seconds.
    pub fn generate_token(&self, username: &str, role: Role) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::minutes(self.expire_minutes))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.expire_minutes * 60) as usize;

        let claims = Claims {
            sub: username.to_string(),
            role,
            exp: expiration,
        };

        debug!(
            "Generating JWT for {} ({}), expires in {}m",
            username,
            role.as_str(),
            self.expire_minutes
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Validate a token's signature and expiry and extract its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}
