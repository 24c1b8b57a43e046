//! User Service
//! Mission: Registration, login, and the role-gated user directory

use crate::auth::models::{Claims, Role, TokenResponse, User, UserPublic};
use crate::auth::{password, policy};
use crate::error::ApiError;
use crate::services::AppState;
use crate::storage::next_id;
use serde::Deserialize;
use tracing::{info, warn};

/// Combinable user-directory filters, ANDed in declaration order against
/// the role-filtered base set.
#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    /// Free-text substring match against username, id, or role.
    pub q: Option<String>,
    /// Exact id match.
    pub id: Option<String>,
    /// Username substring match.
    pub username: Option<String>,
    /// Exact role match.
    pub role: Option<String>,
}

/// Resolve the acting user from validated token claims.
///
/// The token asserts a username; the account is looked up per request, so
/// a deleted user's still-valid token stops working immediately.
pub fn resolve_actor(state: &AppState, claims: &Claims) -> Result<User, ApiError> {
    state
        .users
        .load_all()
        .into_iter()
        .find(|u| u.username == claims.sub)
        .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))
}

/// Register a new account under the given role.
///
/// Usernames are unique across all roles, compared case-sensitively.
/// The id is assigned from the role's prefix-counter namespace.
pub fn register(
    state: &AppState,
    username: &str,
    plain_password: &str,
    role: Role,
) -> Result<UserPublic, ApiError> {
    let password_hash = password::hash_password(plain_password).map_err(|e| {
        warn!("Password hashing failed: {e:#}");
        ApiError::Internal("Failed to process password".to_string())
    })?;

    let public = state.users.update(|users| {
        if users.iter().any(|u| u.username == username) {
            return Err(ApiError::Conflict(
                "User with this username already exists".to_string(),
            ));
        }

        let id = next_id(role.id_prefix(), users.iter().map(|u| u.id.as_str()));
        let user = User {
            id,
            username: username.to_string(),
            role,
            password_hash,
        };
        let public = UserPublic::from_user(&user);
        users.push(user);
        Ok(public)
    })?;

    info!("Registered {} ({})", public.username, public.role.as_str());
    Ok(public)
}

/// Authenticate and issue a bearer token embedding username and role.
pub fn login(state: &AppState, username: &str, plain_password: &str) -> Result<TokenResponse, ApiError> {
    let user = state
        .users
        .load_all()
        .into_iter()
        .find(|u| u.username == username);

    let user = match user {
        Some(u) if password::verify_password(plain_password, &u.password_hash) => u,
        _ => {
            warn!("Failed login attempt: {}", username);
            return Err(ApiError::Unauthorized(
                "Incorrect username or password".to_string(),
            ));
        }
    };

    let (access_token, expires_in) =
        state.jwt.generate_token(&user.username, user.role).map_err(|e| {
            warn!("Token generation failed: {e:#}");
            ApiError::Internal("Failed to issue token".to_string())
        })?;

    info!("Login successful: {} ({})", user.username, user.role.as_str());

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in,
    })
}

/// List the users visible to the actor's role.
pub fn list_users(state: &AppState, actor: &User) -> Result<Vec<UserPublic>, ApiError> {
    Ok(visible_users(state, actor)?
        .iter()
        .map(UserPublic::from_user)
        .collect())
}

/// Fetch one user by id, subject to the actor's visibility rules.
pub fn get_user(state: &AppState, actor: &User, user_id: &str) -> Result<UserPublic, ApiError> {
    let target = state
        .users
        .load_all()
        .into_iter()
        .find(|u| u.id == user_id)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !policy::can_view_user(actor.role, target.role) {
        return Err(ApiError::Forbidden("Not enough permissions".to_string()));
    }

    Ok(UserPublic::from_user(&target))
}

/// Search the visible user set with combinable, ANDed filters.
pub fn search_users(
    state: &AppState,
    actor: &User,
    filters: &UserSearch,
) -> Result<Vec<UserPublic>, ApiError> {
    let mut users = visible_users(state, actor)?;

    if let Some(q) = filters.q.as_deref() {
        users.retain(|u| {
            u.username.contains(q) || u.id.contains(q) || u.role.as_str().contains(q)
        });
    }
    if let Some(id) = filters.id.as_deref() {
        users.retain(|u| u.id == id);
    }
    if let Some(username) = filters.username.as_deref() {
        users.retain(|u| u.username.contains(username));
    }
    if let Some(role) = filters.role.as_deref() {
        // Same parsing as every other role input, so "Admin" and "admin"
        // both name the role; unknown values match nothing.
        let role = Role::from_str(role);
        users.retain(|u| Some(u.role) == role);
    }

    Ok(users.iter().map(UserPublic::from_user).collect())
}

/// Delete a user.
///
/// Self-deletion is a `BadRequest` for every role; beyond that the
/// [`policy::can_delete_user`] matrix decides.
pub fn delete_user(state: &AppState, actor: &User, user_id: &str) -> Result<(), ApiError> {
    let actor_id = actor.id.clone();
    let actor_role = actor.role;

    state.users.update(|users| {
        let target = users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if target.id == actor_id {
            return Err(ApiError::BadRequest(
                "You cannot delete yourself".to_string(),
            ));
        }

        if !policy::can_delete_user(actor_role, target.role) {
            return Err(ApiError::Forbidden(
                "Not enough permissions to delete this user".to_string(),
            ));
        }

        users.retain(|u| u.id != user_id);
        Ok(())
    })?;

    info!("Deleted user {}", user_id);
    Ok(())
}

fn visible_users(state: &AppState, actor: &User) -> Result<Vec<User>, ApiError> {
    if !policy::can_view_users(actor.role) {
        return Err(ApiError::Forbidden("Not enough permissions".to_string()));
    }

    let mut users = state.users.load_all();
    users.retain(|u| policy::can_view_user(actor.role, u.role));
    Ok(users)
}
