use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

use crate::common::{order_payload, Account, TestContext};

struct Fixture {
    buyer: Account,
    supplier: Account,
    other_supplier: Account,
    order_id: i64,
    own_item: i64,
    foreign_item: i64,
}

/// One order with a line item from each of two suppliers.
async fn fixture(ctx: &TestContext) -> Fixture {
    let buyer = ctx.signup(false).await;
    let supplier = ctx.signup(true).await;
    let other_supplier = ctx.signup(true).await;
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let own = ctx.seed_product(sub, Some(&supplier.id), "VVGng 3x2.5", "84.50").await;
    let foreign = ctx.seed_product(sub, Some(&other_supplier.id), "UTP cat5e", "25.00").await;
    let delivery = ctx.seed_method("delivery_methods", "Courier").await;
    let payment = ctx.seed_method("payment_methods", "Card").await;

    let order: Value = ctx
        .server
        .post("/api/v1/orders/create")
        .authorization_bearer(&buyer.token)
        .json(&order_payload(&[(own, 2, "84.50"), (foreign, 1, "25.00")], delivery, payment))
        .await
        .json();

    let item_for = |product: i64| {
        order["order_products"]
            .as_array()
            .unwrap()
            .iter()
            .find(|li| li["product"]["id"] == product)
            .unwrap()["id"]
            .as_i64()
            .unwrap()
    };

    Fixture {
        order_id: order["id"].as_i64().unwrap(),
        own_item: item_for(own),
        foreign_item: item_for(foreign),
        buyer,
        supplier,
        other_supplier,
    }
}

fn status_path(order_id: i64, item_id: i64) -> String {
    format!("/api/v1/orders/supplier/orders/{order_id}/products/{item_id}/status")
}

#[tokio::test]
#[serial]
async fn test_supplier_sees_only_own_line_items() {
    let ctx = context_or_skip!();
    let f = fixture(&ctx).await;

    let list: Value = ctx
        .server
        .get("/api/v1/orders/supplier/orders")
        .authorization_bearer(&f.supplier.token)
        .await
        .json();
    assert_eq!(list["count"], 1);
    let items = list["results"][0]["order_products"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], f.own_item);

    let detail: Value = ctx
        .server
        .get(&format!("/api/v1/orders/supplier/orders/{}", f.order_id))
        .authorization_bearer(&f.other_supplier.token)
        .await
        .json();
    assert_eq!(detail["order_products"].as_array().unwrap().len(), 1);
    assert_eq!(detail["order_products"][0]["id"], f.foreign_item);

    // The buyer still sees both lines
    let buyer_view: Value = ctx
        .server
        .get(&format!("/api/v1/orders/{}", f.order_id))
        .authorization_bearer(&f.buyer.token)
        .await
        .json();
    assert_eq!(buyer_view["order_products"].as_array().unwrap().len(), 2);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_supplier_without_products_sees_nothing() {
    let ctx = context_or_skip!();
    let f = fixture(&ctx).await;
    let stranger = ctx.signup(true).await;

    let list: Value = ctx
        .server
        .get("/api/v1/orders/supplier/orders")
        .authorization_bearer(&stranger.token)
        .await
        .json();
    assert_eq!(list["count"], 0);

    ctx.server
        .get(&format!("/api/v1/orders/supplier/orders/{}", f.order_id))
        .authorization_bearer(&stranger.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_status_notifies_buyer() {
    let ctx = context_or_skip!();
    let f = fixture(&ctx).await;

    let response = ctx
        .server
        .patch(&status_path(f.order_id, f.own_item))
        .authorization_bearer(&f.supplier.token)
        .json(&json!({ "status": "Shipped" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["order_product"]["status"], "Shipped");

    let sms = ctx.sms_to(&f.buyer.phone);
    assert_eq!(sms.len(), 1);
    assert!(sms[0].contains("Shipped"));
    assert!(sms[0].contains(&format!("#{}", f.order_id)));

    // Same status again changes nothing and sends nothing
    ctx.server
        .patch(&status_path(f.order_id, f.own_item))
        .authorization_bearer(&f.supplier.token)
        .json(&json!({ "status": "Shipped" }))
        .await
        .assert_status_ok();
    assert_eq!(ctx.sms_to(&f.buyer.phone).len(), 1);

    let filtered: Value = ctx
        .server
        .get("/api/v1/orders/supplier/orders")
        .authorization_bearer(&f.supplier.token)
        .add_query_param("status", "Pending")
        .await
        .json();
    assert_eq!(filtered["count"], 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_status_survives_sms_failure() {
    let ctx = context_or_skip!();
    let f = fixture(&ctx).await;
    ctx.notifier.fail_sms.store(true, Ordering::SeqCst);

    let response = ctx
        .server
        .patch(&status_path(f.order_id, f.own_item))
        .authorization_bearer(&f.supplier.token)
        .json(&json!({ "status": "Processing" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["order_product"]["status"], "Processing");
    assert!(ctx.sms_to(&f.buyer.phone).is_empty());

    let stored: String = sqlx::query_scalar("SELECT status FROM order_line_items WHERE id = ?")
        .bind(f.own_item)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(stored, "Processing");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_status_of_foreign_line_item() {
    let ctx = context_or_skip!();
    let f = fixture(&ctx).await;

    ctx.server
        .patch(&status_path(f.order_id, f.foreign_item))
        .authorization_bearer(&f.supplier.token)
        .json(&json!({ "status": "Shipped" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Ownership is checked before the status value
    ctx.server
        .patch(&status_path(f.order_id, f.foreign_item))
        .authorization_bearer(&f.supplier.token)
        .json(&json!({ "status": "Lost" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(ctx.sms_to(&f.buyer.phone).is_empty());

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_update_status_rejects_unknown_value() {
    let ctx = context_or_skip!();
    let f = fixture(&ctx).await;

    ctx.server
        .patch(&status_path(f.order_id, f.own_item))
        .authorization_bearer(&f.supplier.token)
        .json(&json!({ "status": "shipped" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .get("/api/v1/orders/supplier/orders")
        .authorization_bearer(&f.supplier.token)
        .add_query_param("status", "Lost")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
