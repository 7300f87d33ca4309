//! Authentication module
//!
//! Provides JWT-based sessions, bcrypt password hashing and role gating.

mod gate;
mod jwt;
mod middleware;
mod password;

pub use gate::{enforce_roles, RoleGate};
pub use jwt::{JwtKeys, ResetClaims, SessionClaims, TokenService};
pub use middleware::{auth_middleware, authenticate_request, AuthUser};
pub use password::PasswordService;
