//! Password Hashing
//! Mission: Salted adaptive hashing, never plaintext at rest

use anyhow::{Context, Result};
use bcrypt::DEFAULT_COST;

/// Hash a plaintext password with bcrypt at the default cost factor.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, DEFAULT_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a mismatch rather than an error, so a
/// corrupted record can never authenticate.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}
