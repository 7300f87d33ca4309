//! Authentication routes
//!
//! Provides endpoints for registration, login, logout and password
//! recovery.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::auth::{auth_middleware, enforce_roles, AuthUser, RoleGate};
use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use jobboard_shared::types::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    ResetPasswordRequest,
};
use jobboard_shared::Role;

/// Create auth routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/registeruser", post(register_user))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password));

    // Layers run bottom-up: authenticate, then check the role
    let privileged = Router::new()
        .route("/register", post(register))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::allow(&[Role::Superadmin]),
            enforce_roles,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let session = Router::new()
        .route("/logout", get(logout).post(logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(privileged).merge(session)
}

/// Self-service registration
///
/// POST /api/v1/auth/registeruser
///
/// # Performance
/// Password hashing is offloaded to blocking thread pool.
async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = AuthService::register_user(state.credentials(), state.tokens(), req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Register an account with any role
///
/// POST /api/v1/auth/register
///
/// # Authentication
/// Requires a superadmin session.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = AuthService::register(state.credentials(), state.tokens(), req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
///
/// # Performance
/// Password verification is offloaded to blocking thread pool.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response =
        AuthService::login(state.credentials(), state.tokens(), &req.email, &req.password).await?;
    Ok(Json(response))
}

/// Revoke all sessions of the caller
///
/// GET|POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let response = AuthService::logout(state.credentials(), auth_user.user_id).await?;
    Ok(Json(response))
}

/// Request a password reset mail
///
/// POST /api/v1/auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = AuthService::forgot_password(
        state.credentials(),
        state.tokens(),
        state.mailer(),
        &state.config().mail.reset_link_base,
        &req.email,
    )
    .await?;
    Ok(Json(response))
}

/// Set a new password using a reset token
///
/// POST /api/v1/auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = AuthService::reset_password(
        state.credentials(),
        state.tokens(),
        &req.token,
        &req.new_password,
    )
    .await?;
    Ok(Json(response))
}
