//! Auth API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running. The cache is disabled, so the
//! verification flow exercises the DB-fallback code path.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

/// Read the stored verification code straight from the fallback column.
async fn stored_code(ctx: &TestContext, email: &str) -> String {
    ctx.db
        .get_user_by_email(email)
        .await
        .unwrap()
        .unwrap()
        .verification_code
        .unwrap()
}

/// Test the full register -> verify -> login flow.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_verify_login_flow() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("flow");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "secret123", None))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["is_verified"], false);
    assert_eq!(body["user"]["registration_source"], "game");
    let user_id = body["user"]["id"].as_i64().unwrap();

    let code = stored_code(&ctx, &email).await;
    let response = server
        .post("/api/auth/verify")
        .json(&fixtures::verify_request(&email, &code))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["access_token"].as_str().is_some());
    assert_eq!(body["user"]["is_verified"], true);

    let response = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, "secret123"))
        .await;
    response.assert_status_ok();
    let token = response.json::<serde_json::Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .get("/api/auth/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status_ok();

    ctx.cleanup_user(user_id).await;
}

/// Test registering the same email twice is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("dupe");

    let first = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "secret123", None))
        .await;
    first.assert_status_ok();
    let user_id = first.json::<serde_json::Value>()["user"]["id"]
        .as_i64()
        .unwrap();

    let second = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "secret123", None))
        .await;
    second.assert_status(StatusCode::CONFLICT);

    ctx.cleanup_user(user_id).await;
}

/// Test short passwords are rejected before any mutation.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_short_password() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("short");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "abc", None))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert!(ctx.db.get_user_by_email(&email).await.unwrap().is_none());
}

/// Test a quest-sourced registration keeps its source.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_quest_source() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("quest");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "secret123", Some("quest")))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["registration_source"], "quest");
    let user_id = body["user"]["id"].as_i64().unwrap();

    ctx.cleanup_user(user_id).await;
}

/// Test a wrong verification code is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_verify_wrong_code() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("badcode");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "secret123", None))
        .await;
    let user_id = response.json::<serde_json::Value>()["user"]["id"]
        .as_i64()
        .unwrap();

    let code = stored_code(&ctx, &email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };
    let response = server
        .post("/api/auth/verify")
        .json(&fixtures::verify_request(&email, wrong))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup_user(user_id).await;
}

/// Test login with a wrong password is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("wrongpw");
    let (user_id, _token) = ctx.create_verified_user(&email).await;

    let response = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, "not-the-password"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup_user(user_id).await;
}

/// Test an unverified user cannot log in.
#[tokio::test]
#[ignore = "requires database"]
async fn test_login_unverified() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("unverified");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "secret123", None))
        .await;
    let user_id = response.json::<serde_json::Value>()["user"]["id"]
        .as_i64()
        .unwrap();

    let response = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, "secret123"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup_user(user_id).await;
}

/// Test logout invalidates the bearer token.
#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_invalidates_token() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("logout");
    let (user_id, token) = ctx.create_verified_user(&email).await;

    server
        .post("/api/auth/logout")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await
        .assert_status_ok();

    let response = server
        .get("/api/auth/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup_user(user_id).await;
}

/// Test protected endpoints require a token at all.
#[tokio::test]
#[ignore = "requires database"]
async fn test_me_requires_auth() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
