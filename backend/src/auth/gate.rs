//! Role-based authorization gate
//!
//! Runs after [`auth_middleware`](super::auth_middleware) and admits a
//! request only when the caller's current role is in the allowed set.

use super::AuthUser;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jobboard_shared::Role;
use std::sync::Arc;
use tracing::debug;

/// Set of roles admitted by a group of routes
#[derive(Debug, Clone)]
pub struct RoleGate {
    allowed: Arc<[Role]>,
}

impl RoleGate {
    pub fn allow(roles: &[Role]) -> Self {
        Self {
            allowed: roles.into(),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// Missing identity and a role outside the set fail the same way
    pub fn check(&self, user: Option<&AuthUser>) -> Result<(), ApiError> {
        match user {
            Some(user) if self.permits(user.user.role) => Ok(()),
            Some(user) => {
                debug!(user_id = %user.user_id, role = %user.user.role, "Forbidden: role not allowed");
                Err(ApiError::Forbidden)
            }
            None => {
                debug!("Forbidden: no authenticated identity");
                Err(ApiError::Forbidden)
            }
        }
    }
}

/// Middleware enforcing a [`RoleGate`]
pub async fn enforce_roles(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.check(request.extensions().get::<AuthUser>())?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::UserRecord;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn caller(role: Role) -> AuthUser {
        let now = Utc::now();
        let id = Uuid::new_v4();
        AuthUser {
            user_id: id,
            user: UserRecord {
                id,
                name: "Abebe".to_string(),
                email: "a@x.com".to_string(),
                phone_number: "0911000001".to_string(),
                password_hash: String::new(),
                role,
                country: None,
                city: None,
                date_of_birth: None,
                education_level: None,
                token_version: 0,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[rstest]
    #[case(Role::User, false)]
    #[case(Role::Admin, true)]
    #[case(Role::Superadmin, true)]
    fn test_staff_gate(#[case] role: Role, #[case] admitted: bool) {
        let gate = RoleGate::allow(&[Role::Admin, Role::Superadmin]);
        assert_eq!(gate.check(Some(&caller(role))).is_ok(), admitted);
    }

    #[rstest]
    #[case(Role::User, false)]
    #[case(Role::Admin, false)]
    #[case(Role::Superadmin, true)]
    fn test_superadmin_gate(#[case] role: Role, #[case] admitted: bool) {
        let gate = RoleGate::allow(&[Role::Superadmin]);
        assert_eq!(gate.check(Some(&caller(role))).is_ok(), admitted);
    }

    #[test]
    fn test_missing_identity_matches_wrong_role() {
        let gate = RoleGate::allow(&[Role::Admin]);
        let missing = gate.check(None).unwrap_err();
        let wrong = gate.check(Some(&caller(Role::User))).unwrap_err();
        assert!(matches!(missing, ApiError::Forbidden));
        assert_eq!(missing.to_string(), wrong.to_string());
    }

    #[test]
    fn test_empty_gate_admits_nobody() {
        let gate = RoleGate::allow(&[]);
        for role in Role::ALL {
            assert!(!gate.permits(role));
        }
    }
}
