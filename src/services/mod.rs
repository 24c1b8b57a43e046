//! Entity Services
//! Mission: Business rules on top of the stores, policy checks first

pub mod categories;
pub mod products;
pub mod users;

use crate::auth::{JwtHandler, User};
use crate::models::{Category, Config, Product};
use crate::storage::JsonStore;
use std::path::Path;
use std::sync::Arc;

/// Application state shared across all requests.
///
/// The three backing stores are independent; the lifecycle of every store
/// and the JWT handler is owned here, by the composition root.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<JsonStore<User>>,
    pub products: Arc<JsonStore<Product>>,
    pub categories: Arc<JsonStore<Category>>,
    pub jwt: Arc<JwtHandler>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let data_dir = Path::new(&config.data_dir);

        Self {
            users: Arc::new(JsonStore::new(data_dir.join("users.json"))),
            products: Arc::new(JsonStore::new(data_dir.join("products.json"))),
            categories: Arc::new(JsonStore::new(data_dir.join("categories.json"))),
            jwt: Arc::new(JwtHandler::new(
                config.jwt_secret.clone(),
                config.token_expire_minutes,
            )),
        }
    }
}
