//! HTTP route handlers.

pub mod activities;
pub mod admin_activities;
pub mod admin_courses;
pub mod admin_products;
pub mod admin_semesters;
pub mod courses;
pub mod dashboard;
pub mod health;
pub mod shop;
pub mod wallet;
