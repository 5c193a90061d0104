//! Shared utilities and common types for Campus Manager backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT token validation and claim types
//! - Common validation logic (student codes, school years)

pub mod jwt;
pub mod validation;
