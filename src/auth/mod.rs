//! Authentication Module
//! Mission: Secure API access with JWT tokens and RBAC

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;

pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
pub use models::{Claims, Role, User, UserPublic};
