//! API Routes
//! Mission: Map requests to service calls, serialize results, nothing else

use crate::auth::models::{
    Claims, LoginRequest, RegisterRequest, Role, TokenResponse, UserPublic,
};
use crate::auth::{auth_middleware, User};
use crate::error::ApiError;
use crate::models::{
    Category, CategoryCreate, Product, ProductCreate, ProductUpdate, PurchaseRequest,
    QuantityDelta,
};
use crate::services::{categories, products, users, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, patch, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Create the full API router: public auth/health endpoints merged with
/// bearer-protected entity routes.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(read_root))
        .route("/health", get(health_check))
        .route("/api/admin-reg", post(register_admin))
        .route("/api/worker-reg", post(register_worker))
        .route("/api/customer-reg", post(register_customer))
        .route("/api/token", post(login));

    let protected = Router::new()
        .route("/api/user/", get(list_users))
        .route("/api/user/search", get(search_users))
        .route("/api/user/:user_id", get(get_user))
        .route("/api/delete-user/:user_id", delete(delete_user))
        .route("/api/products/", get(list_products).post(create_product))
        .route("/api/products/search", get(search_products))
        .route(
            "/api/products/:product_id",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/api/products/:product_id/quantity", patch(adjust_quantity))
        .route("/api/products/:product_id/purchase", post(purchase_product))
        .route(
            "/api/categories/",
            get(list_categories).post(create_category),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}

// ===== Public handlers =====

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the TechMart API!" }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    register_with_role(&state, payload, Role::Admin)
}

async fn register_worker(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    register_with_role(&state, payload, Role::Worker)
}

async fn register_customer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    register_with_role(&state, payload, Role::Customer)
}

fn register_with_role(
    state: &AppState,
    payload: RegisterRequest,
    role: Role,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    let user = users::register(state, &payload.username, &payload.password, role)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(users::login(
        &state,
        &payload.username,
        &payload.password,
    )?))
}

// ===== Protected handlers =====

/// Every protected handler re-resolves the acting user from the token's
/// subject, so revoked accounts fail here rather than at the signature
/// check.
fn actor(state: &AppState, claims: &Claims) -> Result<User, ApiError> {
    users::resolve_actor(state, claims)
}

async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserPublic>>, ApiError> {
    let actor = actor(&state, &claims)?;
    Ok(Json(users::list_users(&state, &actor)?))
}

async fn search_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filters): Query<users::UserSearch>,
) -> Result<Json<Vec<UserPublic>>, ApiError> {
    let actor = actor(&state, &claims)?;
    Ok(Json(users::search_users(&state, &actor, &filters)?))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<UserPublic>, ApiError> {
    let actor = actor(&state, &claims)?;
    Ok(Json(users::get_user(&state, &actor, &user_id)?))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = actor(&state, &claims)?;
    users::delete_user(&state, &actor, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_products(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Product>>, ApiError> {
    actor(&state, &claims)?;
    Ok(Json(products::list_products(&state)))
}

#[derive(Debug, Deserialize)]
struct ProductSearch {
    category: String,
}

async fn search_products(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ProductSearch>,
) -> Result<Json<Vec<Product>>, ApiError> {
    actor(&state, &claims)?;
    Ok(Json(products::products_by_category(
        &state,
        &filter.category,
    )))
}

async fn get_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    actor(&state, &claims)?;
    Ok(Json(products::get_product(&state, &product_id)?))
}

async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let actor = actor(&state, &claims)?;
    let product = products::create_product(&state, &actor, payload)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<String>,
    Json(patch): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    let actor = actor(&state, &claims)?;
    Ok(Json(products::update_product(
        &state,
        &actor,
        &product_id,
        patch,
    )?))
}

async fn adjust_quantity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<String>,
    Json(payload): Json<QuantityDelta>,
) -> Result<Json<Product>, ApiError> {
    let actor = actor(&state, &claims)?;
    Ok(Json(products::adjust_quantity(
        &state,
        &actor,
        &product_id,
        payload.delta,
    )?))
}

async fn purchase_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<String>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<Product>, ApiError> {
    let actor = actor(&state, &claims)?;
    Ok(Json(products::purchase(
        &state,
        &actor,
        &product_id,
        payload.quantity,
    )?))
}

async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = actor(&state, &claims)?;
    products::delete_product(&state, &actor, &product_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Category>>, ApiError> {
    actor(&state, &claims)?;
    Ok(Json(categories::list_categories(&state)))
}

async fn create_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let actor = actor(&state, &claims)?;
    let category = categories::create_category(&state, &actor, &payload.name)?;
    Ok((StatusCode::CREATED, Json(category)))
}
