//! Job Board Shared Library
//!
//! This crate contains shared types, models, and validation used by the
//! backend and its API clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::Role;
pub use types::*;
