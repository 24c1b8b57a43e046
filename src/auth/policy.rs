//! Authorization Policy
//! Mission: Every role rule in one place, none inline at endpoints

use crate::auth::models::Role;

/// Whether `actor` may list or search the user directory at all.
///
/// Customers get a hard `Forbidden` on any user listing; the visible subset
/// for the other roles is decided per target by [`can_view_user`].
pub fn can_view_users(actor: Role) -> bool {
    matches!(actor, Role::Admin | Role::Worker)
}

/// Whether `actor` may see a user with role `target`.
///
/// Admin sees everyone; workers see workers and customers but not admins.
pub fn can_view_user(actor: Role, target: Role) -> bool {
    match actor {
        Role::Admin => true,
        Role::Worker => matches!(target, Role::Worker | Role::Customer),
        Role::Customer => false,
    }
}

/// Whether `actor` may delete a user with role `target`.
///
/// Self-deletion is rejected before this rule applies, as `BadRequest`
/// regardless of role.
pub fn can_delete_user(actor: Role, target: Role) -> bool {
    match actor {
        Role::Admin => true,
        Role::Worker => target == Role::Customer,
        Role::Customer => false,
    }
}

/// Whether `actor` may create, edit, restock, or delete catalog entries
/// (products and categories). Reading the catalog is open to all roles.
pub fn can_manage_catalog(actor: Role) -> bool {
    matches!(actor, Role::Admin | Role::Worker)
}

/// Whether `actor` may purchase products. Only customers buy.
pub fn can_purchase(actor: Role) -> bool {
    actor == Role::Customer
}
