//! Category Service
//! Mission: Create-and-list category registry, unique case-insensitively

use crate::auth::models::User;
use crate::auth::policy;
use crate::error::ApiError;
use crate::models::Category;
use crate::services::AppState;
use tracing::info;

/// List all categories. Open to any authenticated user.
pub fn list_categories(state: &AppState) -> Vec<Category> {
    state.categories.load_all()
}

/// Create a category. Names are unique case-insensitively; categories are
/// never updated or deleted once created.
pub fn create_category(state: &AppState, actor: &User, name: &str) -> Result<Category, ApiError> {
    if !policy::can_manage_catalog(actor.role) {
        return Err(ApiError::Forbidden("Worker rights required".to_string()));
    }

    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Category name cannot be empty".to_string(),
        ));
    }

    let category = state.categories.update(|categories| {
        if categories.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(ApiError::Conflict(
                "Category with this name already exists".to_string(),
            ));
        }

        let category = Category {
            name: name.to_string(),
        };
        categories.push(category.clone());
        Ok(category)
    })?;

    info!("Created category {}", category.name);
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::services::test_support::test_state;
    use crate::services::users::register;

    fn actor(state: &AppState, username: &str, role: Role) -> User {
        register(state, username, "password123", role).unwrap();
        state
            .users
            .load_all()
            .into_iter()
            .find(|u| u.username == username)
            .unwrap()
    }

    #[test]
    fn test_create_and_list() {
        let (state, _dir) = test_state();
        let worker = actor(&state, "worker", Role::Worker);

        create_category(&state, &worker, "Electronics").unwrap();
        create_category(&state, &worker, "Toys").unwrap();

        let names: Vec<String> = list_categories(&state).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Electronics", "Toys"]);
    }

    #[test]
    fn test_duplicate_name_conflicts_case_insensitively() {
        let (state, _dir) = test_state();
        let admin = actor(&state, "admin", Role::Admin);

        create_category(&state, &admin, "Electronics").unwrap();
        let err = create_category(&state, &admin, "ELECTRONICS").unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(list_categories(&state).len(), 1);
    }

    #[test]
    fn test_customer_forbidden() {
        let (state, _dir) = test_state();
        let customer = actor(&state, "customer", Role::Customer);

        assert!(matches!(
            create_category(&state, &customer, "Electronics").unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let (state, _dir) = test_state();
        let worker = actor(&state, "worker", Role::Worker);

        assert!(matches!(
            create_category(&state, &worker, "   ").unwrap_err(),
            ApiError::BadRequest(_)
        ));
    }
}
