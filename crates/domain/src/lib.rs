//! Domain layer for Campus Manager backend.
//!
//! This crate contains:
//! - Domain models (User, Semester, CourseOffering, Activity, Wallet)
//! - Request/response DTOs with validation
//! - The centralized access policy

pub mod models;
pub mod services;
