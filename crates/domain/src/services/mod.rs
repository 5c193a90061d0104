//! Domain services for Campus Manager.
//!
//! Services contain business logic that operates on domain models.

pub mod access;

pub use access::{ensure, is_allowed, AccessDenied, Capability};
