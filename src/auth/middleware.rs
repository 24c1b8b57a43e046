//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::auth::jwt::JwtHandler;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates bearer tokens.
///
/// Extracts `Authorization: Bearer <token>`, validates signature and expiry,
/// and inserts the decoded [`Claims`](crate::auth::models::Claims) into the
/// request extensions for handlers to pick up via `Extension<Claims>`.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

    let claims = jwt_handler.validate_token(token).map_err(|e| {
        debug!("Token rejected: {e:#}");
        ApiError::Unauthorized("Could not validate credentials".to_string())
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
