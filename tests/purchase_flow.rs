//! End-to-end purchase flow against real files on disk.
//!
//! Exercises the same path the HTTP boundary takes: register, log in,
//! resolve the actor from token claims, stock the catalog, purchase, and
//! verify what was persisted.

use techmart_backend::auth::models::{Role, User};
use techmart_backend::error::ApiError;
use techmart_backend::models::{Config, ProductCreate};
use techmart_backend::services::{categories, products, users, AppState};
use tempfile::TempDir;

fn state_on_disk() -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        data_dir: dir.path().to_str().unwrap().to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        token_expire_minutes: 30,
        port: 0,
    };
    (AppState::new(&config), dir)
}

fn user_named(state: &AppState, username: &str) -> User {
    state
        .users
        .load_all()
        .into_iter()
        .find(|u| u.username == username)
        .unwrap()
}

#[test]
fn full_purchase_flow_persists_across_store_reloads() {
    let (state, dir) = state_on_disk();

    // Register a worker and a customer; ids come from their role prefixes.
    let seller = users::register(&state, "seller1", "pass", Role::Worker).unwrap();
    let buyer = users::register(&state, "buyer1", "pass", Role::Customer).unwrap();
    assert_eq!(seller.id, "w1");
    assert_eq!(buyer.id, "c1");

    // Log the customer in and resolve the actor the way the middleware
    // path does: validated claims, then a per-request user lookup.
    let token = users::login(&state, "buyer1", "pass").unwrap();
    let claims = state.jwt.validate_token(&token.access_token).unwrap();
    let buyer = users::resolve_actor(&state, &claims).unwrap();
    assert_eq!(buyer.role, Role::Customer);

    // Worker stocks the catalog.
    let seller = user_named(&state, "seller1");
    categories::create_category(&state, &seller, "Peripherals").unwrap();
    let product = products::create_product(
        &state,
        &seller,
        ProductCreate {
            name: "Mouse".into(),
            description: "Gaming mouse".into(),
            price: 50.0,
            category: "Peripherals".into(),
            quantity: 5,
        },
    )
    .unwrap();

    // Purchase 2 of 5, then overdraw.
    let after = products::purchase(&state, &buyer, &product.id, 2).unwrap();
    assert_eq!(after.quantity, 3);

    let err = products::purchase(&state, &buyer, &product.id, 4).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // A brand-new state over the same directory sees the persisted truth:
    // the successful decrement, not the failed one.
    let reopened = AppState::new(&Config {
        data_dir: dir.path().to_str().unwrap().to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        token_expire_minutes: 30,
        port: 0,
    });
    let persisted = products::get_product(&reopened, &product.id).unwrap();
    assert_eq!(persisted.quantity, 3);
    assert_eq!(reopened.users.load_all().len(), 2);
    assert_eq!(categories::list_categories(&reopened).len(), 1);
}
