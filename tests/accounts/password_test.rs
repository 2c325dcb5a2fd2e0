use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use cable_market::modules::accounts::crud::AccountCrud;
use cable_market::modules::accounts::model::TokenPurpose;
use cable_market::services::hashing;

use crate::common::{test_email, test_password};

#[tokio::test]
#[serial]
async fn test_forgot_and_reset_password() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    ctx.server
        .post("/api/v1/accounts/forgot-password")
        .json(&json!({ "email": account.email }))
        .await
        .assert_status_ok();

    let token = ctx.last_token_for(&account.email).expect("reset email");

    ctx.server
        .post("/api/v1/accounts/reset-password")
        .json(&json!({
            "token": token,
            "new_password": "BrandNewPass9",
            "new_password_confirm": "BrandNewPass9"
        }))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": test_password() }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": "BrandNewPass9" }))
        .await
        .assert_status_ok();

    // Reset tokens are single use
    ctx.server
        .post("/api/v1/accounts/reset-password")
        .json(&json!({
            "token": token,
            "new_password": "AnotherPass77",
            "new_password_confirm": "AnotherPass77"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_reset_token_redeems_once_for_racing_requests() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    ctx.server
        .post("/api/v1/accounts/forgot-password")
        .json(&json!({ "email": account.email }))
        .await
        .assert_status_ok();
    let raw = ctx.last_token_for(&account.email).expect("reset email");

    // Both requests read the token while it was still unused
    let crud = AccountCrud::new(ctx.db.clone());
    let token = crud
        .find_token(TokenPurpose::PasswordReset, &raw)
        .await
        .unwrap()
        .expect("token row");

    let first = hashing::hash_password("FirstWinner11").unwrap();
    let second = hashing::hash_password("SecondLoser22").unwrap();
    assert!(crud.complete_reset(&token, &first).await.unwrap());
    assert!(!crud.complete_reset(&token, &second).await.unwrap());

    ctx.server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": "FirstWinner11" }))
        .await
        .assert_status_ok();
    ctx.server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": "SecondLoser22" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_forgot_password_unknown_email() {
    let ctx = context_or_skip!();

    ctx.server
        .post("/api/v1/accounts/forgot-password")
        .json(&json!({ "email": test_email() }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_change_password() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    ctx.server
        .post("/api/v1/accounts/change-password")
        .authorization_bearer(&account.token)
        .json(&json!({
            "old_password": "NotMyPassword1",
            "new_password": "ChangedPass55",
            "new_password_confirm": "ChangedPass55"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/v1/accounts/change-password")
        .authorization_bearer(&account.token)
        .json(&json!({
            "old_password": test_password(),
            "new_password": "ChangedPass55",
            "new_password_confirm": "ChangedPass56"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/v1/accounts/change-password")
        .authorization_bearer(&account.token)
        .json(&json!({
            "old_password": test_password(),
            "new_password": "ChangedPass55",
            "new_password_confirm": "ChangedPass55"
        }))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": account.email, "password": "ChangedPass55" }))
        .await
        .assert_status_ok();

    ctx.cleanup().await;
}
