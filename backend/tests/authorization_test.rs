//! Integration tests for role-gated routes

mod common;

use axum::http::{Method, StatusCode};
use common::{json, Identity, TestApp};
use jobboard_shared::Role;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Role::User, StatusCode::FORBIDDEN)]
#[case(Role::Admin, StatusCode::FORBIDDEN)]
#[case(Role::Superadmin, StatusCode::OK)]
#[tokio::test]
async fn test_user_listing_gate(#[case] role: Role, #[case] expected: StatusCode) {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user(role).await;

    let (status, _) = app.get_authed("/api/v1/users", &token).await;
    assert_eq!(status, expected);
}

#[rstest]
#[case(Role::User, StatusCode::FORBIDDEN)]
#[case(Role::Admin, StatusCode::FORBIDDEN)]
#[case(Role::Superadmin, StatusCode::CREATED)]
#[tokio::test]
async fn test_privileged_registration_gate(#[case] role: Role, #[case] expected: StatusCode) {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user(role).await;

    let mut body = Identity::fake().registration();
    body["role"] = json!("admin");
    let (status, response) = app
        .post_authed("/api/v1/auth/register", &token, body)
        .await;
    assert_eq!(status, expected);

    if status == StatusCode::CREATED {
        assert_eq!(json(&response)["user"]["role"], "admin");
    }
}

#[tokio::test]
async fn test_forbidden_bodies_are_identical() {
    let app = TestApp::new().await;
    let (_, user_token) = app.seed_user(Role::User).await;
    let (_, admin_token) = app.seed_user(Role::Admin).await;

    let (_, user_body) = app.get_authed("/api/v1/users", &user_token).await;
    let (_, admin_body) = app.get_authed("/api/v1/users", &admin_token).await;
    assert_eq!(user_body, admin_body);
    assert_eq!(json(&user_body)["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_superadmin_manages_users() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.seed_user(Role::Superadmin).await;
    let (member, member_token) = app.seed_user(Role::User).await;
    let member_path = format!("/api/v1/users/{}", member.id);

    let (status, listing) = app
        .get_authed("/api/v1/users?role=user&page=1&limit=10", &admin_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let listing = json(&listing);
    assert_eq!(listing["totalUsers"], 1);
    assert_eq!(listing["users"][0]["id"], member.id.to_string());

    let (status, fetched) = app.get_authed(&member_path, &admin_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&fetched)["email"], member.email);

    // Promote; the live role applies to the member's existing session
    let (status, updated) = app
        .request(
            Method::PATCH,
            &member_path,
            Some(&admin_token),
            Some(json!({ "role": "superadmin", "city": "Addis Ababa" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&updated)["city"], "Addis Ababa");
    let (status, _) = app.get_authed("/api/v1/users", &member_token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::DELETE, &member_path, Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get_authed(&member_path, &admin_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get_authed("/api/v1/users/profile", &member_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_password_change_revokes_sessions() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.seed_user(Role::Superadmin).await;
    let (member, member_token) = app.seed_user(Role::User).await;
    let password_path = format!("/api/v1/users/{}/password", member.id);

    let (status, _) = app
        .request(
            Method::PATCH,
            &password_path,
            Some(&admin_token),
            Some(json!({ "oldPassword": "wrong", "newPassword": "Changed-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::PATCH,
            &password_path,
            Some(&admin_token),
            Some(json!({ "newPassword": "Changed-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::PATCH,
            &password_path,
            Some(&admin_token),
            Some(json!({ "oldPassword": "Pw1!", "newPassword": "Changed-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get_authed("/api/v1/users/profile", &member_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            json!({ "email": member.email, "password": "Changed-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
