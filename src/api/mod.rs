//! HTTP Boundary
//! Mission: Thin routing glue between axum and the entity services

pub mod routes;

pub use routes::create_router;
