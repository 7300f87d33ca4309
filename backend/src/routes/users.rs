//! User profile and administration routes
//!
//! `/profile` serves any authenticated caller; everything else is
//! restricted to superadmins.

use crate::auth::{auth_middleware, enforce_roles, AuthUser, RoleGate};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, patch},
    Json, Router,
};
use jobboard_shared::types::{
    ChangePasswordRequest, MessageResponse, UpdateUserRequest, UserListQuery, UserListResponse,
    UserView,
};
use jobboard_shared::Role;
use uuid::Uuid;

/// Create user routes
pub fn user_routes(state: AppState) -> Router<AppState> {
    let profile = Router::new()
        .route("/profile", get(get_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin = Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/:id/password", patch(change_password))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::allow(&[Role::Superadmin]),
            enforce_roles,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    profile.merge(admin)
}

/// Current caller's profile
///
/// GET /api/v1/users/profile
async fn get_profile(auth_user: AuthUser) -> Json<UserView> {
    Json(auth_user.user.to_view())
}

/// GET /api/v1/users?role=&page=&limit=
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<UserListResponse>> {
    Ok(Json(state.credentials().list(&query).await?))
}

/// GET /api/v1/users/:id
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserView>> {
    let user = state
        .credentials()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user.to_view()))
}

/// PATCH /api/v1/users/:id
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserView>> {
    let user = state.credentials().update_profile_fields(id, req).await?;
    Ok(Json(user.to_view()))
}

/// PATCH /api/v1/users/:id/password
async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .credentials()
        .change_password(id, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// DELETE /api/v1/users/:id
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.credentials().delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
