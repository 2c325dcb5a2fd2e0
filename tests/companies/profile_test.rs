use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

async fn my_company_id(ctx: &crate::common::TestContext, token: &str) -> i64 {
    let body: Value = ctx
        .server
        .get("/api/v1/accounts/company")
        .authorization_bearer(token)
        .await
        .json();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
#[serial]
async fn test_supplier_sees_own_company() {
    let ctx = context_or_skip!();
    let supplier = ctx.signup(true).await;

    let response = ctx
        .server
        .get("/api/v1/accounts/company")
        .authorization_bearer(&supplier.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name_company"], "Kabel LLC");
    assert_eq!(body["user"], supplier.id.as_str());
    assert_eq!(body["documents"], json!([]));

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_buyer_has_no_company() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;

    ctx.server
        .get("/api/v1/accounts/company")
        .authorization_bearer(&buyer.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_company_requisites() {
    let ctx = context_or_skip!();
    let supplier = ctx.signup(true).await;
    let id = my_company_id(&ctx, &supplier.token).await;

    let response = ctx
        .server
        .put(&format!("/api/v1/accounts/companies/{id}/update"))
        .authorization_bearer(&supplier.token)
        .json(&json!({
            "organizational_legal_form": "ООО",
            "inn": "7707083893",
            "kpp": "773601001",
            "bic": "044525225",
            "settlement_account": "40702810938000000001",
            "registration_date": "2015-03-17",
            "matches_legal_address": true,
            "acts_on_basis": "Устав"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["inn"], "7707083893");
    assert_eq!(body["registration_date"], "2015-03-17");
    assert_eq!(body["matches_legal_address"], true);
    // Untouched fields keep their value
    assert_eq!(body["name_company"], "Kabel LLC");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_company_rejects_bad_identifiers() {
    let ctx = context_or_skip!();
    let supplier = ctx.signup(true).await;
    let id = my_company_id(&ctx, &supplier.token).await;

    let response = ctx
        .server
        .put(&format!("/api/v1/accounts/companies/{id}/update"))
        .authorization_bearer(&supplier.token)
        .json(&json!({ "inn": "12345", "organizational_legal_form": "LLC" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["fields"]["inn"].is_array());
    assert!(body["fields"]["organizational_legal_form"].is_array());

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_cannot_update_someone_elses_company() {
    let ctx = context_or_skip!();
    let owner = ctx.signup(true).await;
    let other = ctx.signup(true).await;
    let id = my_company_id(&ctx, &owner.token).await;

    ctx.server
        .put(&format!("/api/v1/accounts/companies/{id}/update"))
        .authorization_bearer(&other.token)
        .json(&json!({ "name_company": "Hijacked" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}
