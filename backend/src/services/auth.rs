//! Authentication flows: registration, login, logout and password recovery
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - Token service is passed by reference (pre-computed keys)
//! - Reset mail is delivered from a background task, off the request path

use crate::auth::TokenService;
use crate::error::ApiError;
use crate::repositories::UserRecord;
use crate::services::mail::{render_reset_email, reset_link, Mailer};
use crate::services::CredentialStore;
use jobboard_shared::types::{AuthResponse, MessageResponse, RegisterRequest};
use jobboard_shared::{validation, AuthError, Role};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const RESET_SUBJECT: &str = "Reset Password";
const FORGOT_PASSWORD_ACK: &str =
    "If an account with that email exists, a password reset link has been sent";

/// Authentication flow service
pub struct AuthService;

fn session_response(
    tokens: &TokenService,
    user: &UserRecord,
    message: &str,
) -> Result<AuthResponse, ApiError> {
    let token = tokens.issue_session(user).map_err(ApiError::Internal)?;

    Ok(AuthResponse {
        success: true,
        message: message.to_string(),
        token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.session_lifetime_secs(),
        user: user.to_view(),
    })
}

impl AuthService {
    /// Self-service registration; always creates a `user`
    pub async fn register_user(
        credentials: &CredentialStore,
        tokens: &TokenService,
        mut req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        req.role = Some(Role::User);
        let user = credentials.create(req).await?;
        session_response(tokens, &user, "User registered successfully")
    }

    /// Privileged registration; the request may name any role
    pub async fn register(
        credentials: &CredentialStore,
        tokens: &TokenService,
        req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let user = credentials.create(req).await?;
        session_response(tokens, &user, "User registered successfully")
    }

    /// Login with email and password
    ///
    /// # Performance
    /// Password verification is offloaded to blocking thread pool.
    pub async fn login(
        credentials: &CredentialStore,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let user = credentials.authenticate(email, password).await?;
        info!(user_id = %user.id, "User logged in");
        session_response(tokens, &user, "Login successful")
    }

    /// Revoke every session of the caller, including the current one
    pub async fn logout(
        credentials: &CredentialStore,
        user_id: Uuid,
    ) -> Result<MessageResponse, ApiError> {
        credentials.revoke_sessions(user_id).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(MessageResponse::new("Logged out successfully"))
    }

    /// Start password recovery
    ///
    /// The response is the same whether or not the email belongs to an
    /// account. For a known account the reset mail is sent in the
    /// background and its outcome only logged.
    pub async fn forgot_password(
        credentials: &CredentialStore,
        tokens: &TokenService,
        mailer: Arc<dyn Mailer>,
        reset_link_base: &str,
        email: &str,
    ) -> Result<MessageResponse, ApiError> {
        validation::validate_email(email).map_err(ApiError::Validation)?;

        if let Some(user) = credentials.find_by_email(email).await? {
            let token = tokens.issue_reset(&user.email).map_err(ApiError::Internal)?;
            let body = render_reset_email(&reset_link(reset_link_base, &token));
            let user_id = user.id;
            let to = user.email;

            tokio::spawn(async move {
                match mailer.send(&to, RESET_SUBJECT, &body).await {
                    Ok(()) => info!(user_id = %user_id, "Password reset mail sent"),
                    Err(e) => warn!(user_id = %user_id, error = %e, "Password reset mail failed"),
                }
            });
        }

        Ok(MessageResponse::new(FORGOT_PASSWORD_ACK))
    }

    /// Complete password recovery for the account named by the reset token
    pub async fn reset_password(
        credentials: &CredentialStore,
        tokens: &TokenService,
        token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let claims = tokens.verify_reset(token).map_err(|e| match e {
            AuthError::TokenExpired => ApiError::ExpiredResetToken,
            _ => ApiError::InvalidResetToken,
        })?;

        let user = credentials
            .find_by_email(&claims.user_email)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        // Issued for an earlier holder of this address
        if claims.iat < user.created_at.timestamp() {
            warn!(user_id = %user.id, "Reset token predates the account");
            return Err(ApiError::InvalidResetToken);
        }

        credentials.update_password(&user, new_password).await?;
        info!(user_id = %user.id, "Password reset completed");

        Ok(MessageResponse::new("Password has been reset successfully"))
    }
}
