//! Product Service
//! Mission: Catalog CRUD, stock arithmetic, and the purchase path

use crate::auth::models::User;
use crate::auth::policy;
use crate::error::ApiError;
use crate::models::{Product, ProductCreate, ProductUpdate};
use crate::services::AppState;
use crate::storage::next_id;
use tracing::info;

/// List the whole catalog. Open to any authenticated user.
pub fn list_products(state: &AppState) -> Vec<Product> {
    state.products.load_all()
}

/// Fetch one product by id.
pub fn get_product(state: &AppState, product_id: &str) -> Result<Product, ApiError> {
    state
        .products
        .load_all()
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}

/// Filter the catalog by category name, case-insensitive exact match.
pub fn products_by_category(state: &AppState, category: &str) -> Vec<Product> {
    state
        .products
        .load_all()
        .into_iter()
        .filter(|p| p.category.eq_ignore_ascii_case(category))
        .collect()
}

/// Create a product. The category must already exist.
pub fn create_product(
    state: &AppState,
    actor: &User,
    payload: ProductCreate,
) -> Result<Product, ApiError> {
    require_catalog_manager(actor)?;

    if payload.price < 0.0 {
        return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
    }
    require_category(state, &payload.category)?;

    let product = state.products.update(|products| {
        let id = next_id("p", products.iter().map(|p| p.id.as_str()));
        let product = Product {
            id,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category: payload.category,
            quantity: payload.quantity,
        };
        products.push(product.clone());
        Ok(product)
    })?;

    info!("Created product {} ({})", product.name, product.id);
    Ok(product)
}

/// Apply a partial update; only fields present in the patch are touched.
///
/// A present `category` must already exist and a present `price` must be
/// non-negative. The source this service replaces let a negative price
/// through on edit; that was an oversight, not a contract, and is rejected
/// here.
pub fn update_product(
    state: &AppState,
    actor: &User,
    product_id: &str,
    patch: ProductUpdate,
) -> Result<Product, ApiError> {
    require_catalog_manager(actor)?;

    if let Some(price) = patch.price {
        if price < 0.0 {
            return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
        }
    }
    if let Some(category) = patch.category.as_deref() {
        require_category(state, category)?;
    }

    state.products.update(|products| {
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }

        Ok(product.clone())
    })
}

/// Apply a signed stock delta. The resulting quantity must stay within
/// `0..=u32::MAX`; anything outside is rejected without touching stock.
pub fn adjust_quantity(
    state: &AppState,
    actor: &User,
    product_id: &str,
    delta: i64,
) -> Result<Product, ApiError> {
    require_catalog_manager(actor)?;

    state.products.update(|products| {
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        let new_quantity = i64::from(product.quantity)
            .checked_add(delta)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| {
                ApiError::BadRequest("Resulting quantity is out of range".to_string())
            })?;

        product.quantity = new_quantity;
        Ok(product.clone())
    })
}

/// Purchase a quantity of a product, decrementing stock.
///
/// Customers only; the whole reservation either happens or the stock is
/// untouched.
pub fn purchase(
    state: &AppState,
    actor: &User,
    product_id: &str,
    quantity: u32,
) -> Result<Product, ApiError> {
    if !policy::can_purchase(actor.role) {
        return Err(ApiError::Forbidden(
            "Only customers can purchase products".to_string(),
        ));
    }
    if quantity == 0 {
        return Err(ApiError::BadRequest(
            "Purchase quantity must be greater than zero".to_string(),
        ));
    }

    let product = state.products.update(|products| {
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        if product.quantity < quantity {
            return Err(ApiError::BadRequest(format!(
                "Not enough items in stock. Available: {}. Please check other products.",
                product.quantity
            )));
        }

        product.quantity -= quantity;
        Ok(product.clone())
    })?;

    info!(
        "Purchase: {} x{} by {} ({} left)",
        product.id, quantity, actor.username, product.quantity
    );
    Ok(product)
}

/// Remove a product from the catalog.
pub fn delete_product(state: &AppState, actor: &User, product_id: &str) -> Result<(), ApiError> {
    require_catalog_manager(actor)?;

    state.products.update(|products| {
        if !products.iter().any(|p| p.id == product_id) {
            return Err(ApiError::NotFound("Product not found".to_string()));
        }
        products.retain(|p| p.id != product_id);
        Ok(())
    })?;

    info!("Deleted product {}", product_id);
    Ok(())
}

fn require_catalog_manager(actor: &User) -> Result<(), ApiError> {
    if policy::can_manage_catalog(actor.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Worker rights required".to_string()))
    }
}

fn require_category(state: &AppState, name: &str) -> Result<(), ApiError> {
    let exists = state
        .categories
        .load_all()
        .iter()
        .any(|c| c.name.eq_ignore_ascii_case(name));

    if exists {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Category '{name}' does not exist"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::services::categories;
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

    fn laptop(category: &str) -> ProductCreate {
        ProductCreate {
            name: "Laptop".into(),
            description: "A cool laptop".into(),
            price: 1200.50,
            category: category.into(),
            quantity: 10,
        }
    }

    fn seeded(state: &AppState) -> (User, User, Product) {
        let worker = actor(state, "seller", Role::Worker);
        let customer = actor(state, "buyer", Role::Customer);
        categories::create_category(state, &worker, "Electronics").unwrap();
        let product = create_product(state, &worker, laptop("Electronics")).unwrap();
        (worker, customer, product)
    }

    #[test]
    fn test_create_requires_existing_category() {
        let (state, _dir) = test_state();
        let worker = actor(&state, "worker", Role::Worker);

        let err = create_product(&state, &worker, laptop("Electronics")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        // After the category exists the same call succeeds.
        categories::create_category(&state, &worker, "Electronics").unwrap();
        let product = create_product(&state, &worker, laptop("Electronics")).unwrap();
        assert_eq!(product.id, "p1");
    }

    #[test]
    fn test_category_reference_is_case_insensitive() {
        let (state, _dir) = test_state();
        let worker = actor(&state, "worker", Role::Worker);
        categories::create_category(&state, &worker, "Electronics").unwrap();

        let product = create_product(&state, &worker, laptop("electronics")).unwrap();
        assert_eq!(product.category, "electronics");

        let found = products_by_category(&state, "ELECTRONICS");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, product.id);
    }

    #[test]
    fn test_customer_cannot_manage_catalog() {
        let (state, _dir) = test_state();
        let worker = actor(&state, "worker", Role::Worker);
        let customer = actor(&state, "customer", Role::Customer);
        categories::create_category(&state, &worker, "Electronics").unwrap();

        assert!(matches!(
            create_product(&state, &customer, laptop("Electronics")).unwrap_err(),
            ApiError::Forbidden(_)
        ));

        let product = create_product(&state, &worker, laptop("Electronics")).unwrap();
        assert!(matches!(
            delete_product(&state, &customer, &product.id).unwrap_err(),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            adjust_quantity(&state, &customer, &product.id, 5).unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }

    #[test]
    fn test_purchase_decrements_and_rejects_overdraw() {
        let (state, _dir) = test_state();
        let (_worker, customer, product) = seeded(&state);

        // quantity 10, take 2 -> 8, take 6 -> 2
        assert_eq!(purchase(&state, &customer, &product.id, 2).unwrap().quantity, 8);
        assert_eq!(purchase(&state, &customer, &product.id, 6).unwrap().quantity, 2);

        // Overdraw names the available count and leaves stock untouched.
        let err = purchase(&state, &customer, &product.id, 4).unwrap_err();
        match err {
            ApiError::BadRequest(detail) => {
                assert!(detail.contains("Not enough items in stock"));
                assert!(detail.contains("Available: 2"));
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
        assert_eq!(get_product(&state, &product.id).unwrap().quantity, 2);
    }

    #[test]
    fn test_only_customers_purchase() {
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        assert!(matches!(
            purchase(&state, &worker, &product.id, 1).unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }

    #[test]
    fn test_purchase_unknown_product_not_found() {
        let (state, _dir) = test_state();
        let customer = actor(&state, "buyer", Role::Customer);
        assert!(matches!(
            purchase(&state, &customer, "p99", 1).unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_quantity_delta_floors_at_zero() {
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        assert_eq!(adjust_quantity(&state, &worker, &product.id, -4).unwrap().quantity, 6);
        assert_eq!(adjust_quantity(&state, &worker, &product.id, 10).unwrap().quantity, 16);

        let err = adjust_quantity(&state, &worker, &product.id, -17).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(get_product(&state, &product.id).unwrap().quantity, 16);
    }

    #[test]
    fn test_quantity_delta_rejects_out_of_range_results() {
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        // A delta pushing the result past u32::MAX must not wrap or
        // truncate into a bogus stock level.
        let err = adjust_quantity(&state, &worker, &product.id, 5_000_000_000).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(get_product(&state, &product.id).unwrap().quantity, 10);

        // Same for a delta that would overflow the i64 sum itself.
        let err = adjust_quantity(&state, &worker, &product.id, i64::MAX).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(get_product(&state, &product.id).unwrap().quantity, 10);
    }

    #[test]
    fn test_partial_update_touches_only_present_fields() {
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        let updated = update_product(
            &state,
            &worker,
            &product.id,
            ProductUpdate {
                price: Some(999.0),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.price, 999.0);
        assert_eq!(updated.name, product.name);
        assert_eq!(updated.quantity, product.quantity);
    }

    #[test]
    fn test_update_rejects_negative_price() {
        // Decision: the upstream behavior of applying a negative price on
        // edit was an oversight; edits validate price like creation does.
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        let err = update_product(
            &state,
            &worker,
            &product.id,
            ProductUpdate {
                price: Some(-5.0),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(get_product(&state, &product.id).unwrap().price, 1200.50);
    }

    #[test]
    fn test_update_validates_category_when_present() {
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        let err = update_product(
            &state,
            &worker,
            &product.id,
            ProductUpdate {
                category: Some("Toys".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        categories::create_category(&state, &worker, "Toys").unwrap();
        let updated = update_product(
            &state,
            &worker,
            &product.id,
            ProductUpdate {
                category: Some("toys".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.category, "toys");
    }

    #[test]
    fn test_delete_product() {
        let (state, _dir) = test_state();
        let (worker, _customer, product) = seeded(&state);

        delete_product(&state, &worker, &product.id).unwrap();
        assert!(matches!(
            get_product(&state, &product.id).unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            delete_product(&state, &worker, &product.id).unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_product_ids_continue_past_surviving_max() {
        let (state, _dir) = test_state();
        let (worker, _customer, first) = seeded(&state);
        assert_eq!(first.id, "p1");

        let second = create_product(&state, &worker, laptop("Electronics")).unwrap();
        assert_eq!(second.id, "p2");

        // Deleting below the max leaves a permanent gap.
        delete_product(&state, &worker, &first.id).unwrap();
        let third = create_product(&state, &worker, laptop("Electronics")).unwrap();
        assert_eq!(third.id, "p3");
    }
}
