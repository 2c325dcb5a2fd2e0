use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

use crate::common::test_password;

#[tokio::test]
#[serial]
async fn test_admin_requires_staff() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;

    ctx.server
        .get("/api/v1/admin/accounts")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .get("/api/v1/admin/accounts")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    ctx.server
        .post("/api/v1/admin/delivery-methods")
        .authorization_bearer(&buyer.token)
        .json(&json!({ "name": "Courier" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_list_accounts_by_role() {
    let ctx = context_or_skip!();
    let staff = ctx.staff().await;
    ctx.signup(true).await;
    ctx.signup(false).await;

    let suppliers: Value = ctx
        .server
        .get("/api/v1/admin/accounts")
        .authorization_bearer(&staff.token)
        .add_query_param("role", "supplier")
        .await
        .json();
    assert_eq!(suppliers["count"], 1);
    assert_eq!(suppliers["results"][0]["role"], "supplier");

    let everyone: Value = ctx
        .server
        .get("/api/v1/admin/accounts")
        .authorization_bearer(&staff.token)
        .await
        .json();
    assert_eq!(everyone["count"], 3);

    ctx.server
        .get("/api/v1/admin/accounts")
        .authorization_bearer(&staff.token)
        .add_query_param("role", "wizard")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_deactivate_account_blocks_login() {
    let ctx = context_or_skip!();
    let staff = ctx.staff().await;
    let buyer = ctx.signup(false).await;

    let response = ctx
        .server
        .patch(&format!("/api/v1/admin/accounts/{}", buyer.id))
        .authorization_bearer(&staff.token)
        .json(&json!({ "is_active": false }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_active"], false);
    assert_eq!(body["is_staff"], false);

    ctx.server
        .post("/api/v1/accounts/login")
        .json(&json!({ "email_or_phone": buyer.email, "password": test_password() }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .patch("/api/v1/admin/accounts/00000000-0000-0000-0000-000000000000")
        .authorization_bearer(&staff.token)
        .json(&json!({ "is_active": false }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_deactivated_account_token_is_refused() {
    let ctx = context_or_skip!();
    let staff = ctx.staff().await;
    let buyer = ctx.signup(false).await;

    ctx.server
        .get("/api/v1/accounts/user")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status_ok();

    ctx.server
        .patch(&format!("/api/v1/admin/accounts/{}", buyer.id))
        .authorization_bearer(&staff.token)
        .json(&json!({ "is_active": false }))
        .await
        .assert_status_ok();

    // The access token issued before deactivation no longer works
    ctx.server
        .get("/api/v1/accounts/user")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .get("/api/v1/orders/my-orders")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Anonymous-friendly routes treat it as a guest
    ctx.server
        .get("/api/v1/products/products")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status_ok();

    ctx.cleanup().await;
}
