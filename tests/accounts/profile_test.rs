use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_get_user_requires_token() {
    let ctx = context_or_skip!();

    ctx.server
        .get("/api/v1/accounts/user")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .get("/api/v1/accounts/user")
        .authorization_bearer("not-a-jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_profile_address() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;

    let response = ctx
        .server
        .put("/api/v1/accounts/user")
        .authorization_bearer(&account.token)
        .json(&json!({
            "first_name": "Olga",
            "city": "Kazan",
            "street": "Bauman",
            "house": "12",
            "index": "420111"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["first_name"], "Olga");
    assert_eq!(body["last_name"], "Petrov");
    assert_eq!(body["city"], "Kazan");
    assert_eq!(body["index"], "420111");

    let me: Value = ctx
        .server
        .get("/api/v1/accounts/user")
        .authorization_bearer(&account.token)
        .await
        .json();
    assert_eq!(me["street"], "Bauman");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_verify_email_flow() {
    let ctx = context_or_skip!();
    let account = ctx.signup(false).await;
    let token = ctx.last_token_for(&account.email).expect("verification email");

    ctx.server
        .get("/api/v1/accounts/verify-email")
        .add_query_param("token", &token)
        .await
        .assert_status_ok();

    let me: Value = ctx
        .server
        .get("/api/v1/accounts/user")
        .authorization_bearer(&account.token)
        .await
        .json();
    assert_eq!(me["is_email_verified"], true);

    // Tokens are single use
    ctx.server
        .get("/api/v1/accounts/verify-email")
        .add_query_param("token", &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/v1/accounts/verify-email/resend")
        .authorization_bearer(&account.token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_verify_email_missing_token() {
    let ctx = context_or_skip!();

    ctx.server
        .get("/api/v1/accounts/verify-email")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
