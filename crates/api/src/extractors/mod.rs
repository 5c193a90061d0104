//! Custom Axum extractors.

pub mod auth;

#[allow(unused_imports)] // Re-exports for downstream use
pub use auth::AuthUser;
