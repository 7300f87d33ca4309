//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod auth;
pub mod credentials;
pub mod mail;

pub use auth::AuthService;
pub use credentials::CredentialStore;
pub use mail::{build_mailer, LogMailer, Mailer};
