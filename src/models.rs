//! Catalog Models & Configuration
//! Mission: Product and category records plus the env-driven app config

use crate::auth::jwt::DEFAULT_EXPIRE_MINUTES;
use serde::{Deserialize, Serialize};

/// Product record as persisted in the products collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String, // "p" + counter
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String, // references a Category name, case-insensitively
    pub quantity: u32,
}

/// Category record. Keyed by name, unique case-insensitively; never
/// updated or deleted once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
}

/// Product creation payload
#[derive(Debug, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub quantity: u32,
}

/// Partial product update. Only present fields are applied; no field of a
/// product is nullable, so absent and explicit-null collapse on purpose.
#[derive(Debug, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
}

/// Stock adjustment payload: a signed delta applied to the current quantity.
#[derive(Debug, Deserialize)]
pub struct QuantityDelta {
    pub delta: i64,
}

/// Purchase payload
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default = "default_purchase_quantity")]
    pub quantity: u32,
}

fn default_purchase_quantity() -> u32 {
    1
}

/// Category creation payload
#[derive(Debug, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub jwt_secret: String,
    pub token_expire_minutes: i64,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./database".to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

        let token_expire_minutes = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXPIRE_MINUTES);

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Self {
            data_dir,
            jwt_secret,
            token_expire_minutes,
            port,
        })
    }
}
