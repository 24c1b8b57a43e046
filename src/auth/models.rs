//! Authentication Models
//! Mission: User records, roles, and token payloads

use serde::{Deserialize, Serialize};

/// User account as persisted in the users collection.
///
/// Never mutated after registration except deletion. The password hash
/// stays in the persisted record and only ever leaves the API through
/// [`UserPublic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub password_hash: String, // bcrypt hash
}

/// User roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // Full access, including the user directory
    #[serde(rename = "worker")]
    Worker, // Catalog management + worker/customer directory
    #[serde(rename = "customer")]
    Customer, // Browse and purchase only
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
            Role::Customer => "customer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "worker" => Some(Role::Worker),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Prefix of the per-role id namespace (`a1`, `w1`, `c1`, ...).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "a",
            Role::Worker => "w",
            Role::Customer => "c",
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub role: Role,
    pub exp: usize, // expiration timestamp
}

/// Registration request body (the endpoint fixes the role)
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String, // always "bearer"
    pub expires_in: usize,  // seconds until expiration
}

/// User view without the password hash
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserPublic {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl UserPublic {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}
