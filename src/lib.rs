//! TechMart Backend Library
//!
//! Exposes the full module tree so the binary and integration tests share
//! one crate.

pub mod api;
pub mod auth;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use services::AppState;
