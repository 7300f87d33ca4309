//! Authentication middleware
//!
//! Provides Axum middleware for session validation and user extraction.
//!
//! # Performance
//!
//! Uses pre-computed JWT keys from AppState to avoid expensive
//! key derivation on every request.

use crate::error::ApiError;
use crate::repositories::UserRecord;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

/// Authenticated user resolved from a session token
///
/// Carries the live identity record, so role checks see the current
/// role rather than the one embedded in the token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub user: UserRecord,
}

/// Extract the token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Resolve the request's session token to a live identity
///
/// Every rejection is the same `Unauthorized`; the reason is only logged.
pub async fn authenticate_request(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthUser, ApiError> {
    let Some(token) = bearer_token(headers) else {
        debug!("Rejected request: missing or malformed authorization header");
        return Err(ApiError::Unauthorized);
    };

    let claims = state.tokens().verify_session(token).map_err(|e| {
        debug!(reason = %e, "Rejected request: session token");
        ApiError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| {
        debug!("Rejected request: malformed user id in token");
        ApiError::Unauthorized
    })?;

    let Some(user) = state.credentials().find_by_id(user_id).await? else {
        debug!(user_id = %user_id, "Rejected request: identity no longer exists");
        return Err(ApiError::Unauthorized);
    };

    if user.token_version != claims.ver {
        debug!(user_id = %user_id, "Rejected request: session revoked");
        return Err(ApiError::Unauthorized);
    }

    Ok(AuthUser { user_id, user })
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by auth_middleware
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        authenticate_request(&app_state, &parts.headers).await
    }
}

/// Middleware for authentication
///
/// Apply to a group of routes via `route_layer`; the resolved
/// [`AuthUser`] is placed in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate_request(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
