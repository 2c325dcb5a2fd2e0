use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

use crate::common::test_password;

#[tokio::test]
#[serial]
async fn test_login_with_email_and_phone() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    let by_email = ctx
        .server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email.to_uppercase(), "password": test_password() }))
        .await;
    by_email.assert_status_ok();
    let body: Value = by_email.json();
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["refresh_token"].as_str().is_some());

    let by_phone = ctx
        .server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.phone, "password": test_password() }))
        .await;
    by_phone.assert_status_ok();
    let body: Value = by_phone.json();
    assert_eq!(body["user"]["id"], account.id.as_str());

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_login_wrong_password() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    let response = ctx
        .server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": "WrongPassword1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_login_disabled_account() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;
    sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = ?")
        .bind(&account.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": test_password() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_refresh_token_rotation() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    let login: Value = ctx
        .server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": test_password() }))
        .await
        .json();

    let response = ctx
        .server
        .post("/api/v1/accounts/token/refresh")
        .json(&json!({ "refresh_token": login["refresh_token"] }))
        .await;
    response.assert_status_ok();
    let refreshed: Value = response.json();

    ctx.server
        .get("/api/v1/accounts/user")
        .authorization_bearer(refreshed["access_token"].as_str().unwrap())
        .await
        .assert_status_ok();

    // An access token is not accepted as a refresh token
    ctx.server
        .post("/api/v1/accounts/token/refresh")
        .json(&json!({ "refresh_token": login["access_token"] }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}
