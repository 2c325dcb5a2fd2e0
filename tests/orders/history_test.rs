use axum::http::StatusCode;
use serde_json::Value;
use serial_test::serial;

use crate::common::order_payload;

#[tokio::test]
#[serial]
async fn test_my_orders_are_scoped_and_filtered() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;
    let other = ctx.signup(false).await;
    let (_, power) = ctx.seed_categories("Power cables").await;
    let (_, signal) = ctx.seed_categories("Signal cables").await;
    let cable = ctx.seed_product(power, None, "VVGng 3x2.5", "84.50").await;
    let utp = ctx.seed_product(signal, None, "UTP cat5e", "25.00").await;
    let delivery = ctx.seed_method("delivery_methods", "Courier").await;
    let payment = ctx.seed_method("payment_methods", "Card").await;

    for (token, product) in [(&buyer.token, cable), (&buyer.token, utp), (&other.token, cable)] {
        ctx.server
            .post("/api/v1/orders/create")
            .authorization_bearer(token)
            .json(&order_payload(&[(product, 1, "10.00")], delivery, payment))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let all: Value = ctx
        .server
        .get("/api/v1/orders/my-orders")
        .authorization_bearer(&buyer.token)
        .await
        .json();
    assert_eq!(all["count"], 2);

    let by_name: Value = ctx
        .server
        .get("/api/v1/orders/my-orders")
        .authorization_bearer(&buyer.token)
        .add_query_param("product_name", "utp")
        .await
        .json();
    assert_eq!(by_name["count"], 1);
    assert_eq!(by_name["results"][0]["order_products"][0]["product"]["id"], utp);

    let by_category: Value = ctx
        .server
        .get("/api/v1/orders/my-orders")
        .authorization_bearer(&buyer.token)
        .add_query_param("sub_category_id", power)
        .await
        .json();
    assert_eq!(by_category["count"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_order_detail_of_another_buyer_is_hidden() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;
    let other = ctx.signup(false).await;
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let cable = ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;
    let delivery = ctx.seed_method("delivery_methods", "Courier").await;
    let payment = ctx.seed_method("payment_methods", "Card").await;

    let created: Value = ctx
        .server
        .post("/api/v1/orders/create")
        .authorization_bearer(&buyer.token)
        .json(&order_payload(&[(cable, 1, "84.50")], delivery, payment))
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    ctx.server
        .get(&format!("/api/v1/orders/{id}"))
        .authorization_bearer(&buyer.token)
        .await
        .assert_status_ok();

    ctx.server
        .get(&format!("/api/v1/orders/{id}"))
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_order_keeps_retired_products() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let cable = ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;
    let delivery = ctx.seed_method("delivery_methods", "Courier").await;
    let payment = ctx.seed_method("payment_methods", "Card").await;

    let created: Value = ctx
        .server
        .post("/api/v1/orders/create")
        .authorization_bearer(&buyer.token)
        .json(&order_payload(&[(cable, 1, "84.50")], delivery, payment))
        .await
        .json();
    ctx.deactivate_product(cable).await;

    let order: Value = ctx
        .server
        .get(&format!("/api/v1/orders/{}", created["id"]))
        .authorization_bearer(&buyer.token)
        .await
        .json();
    assert_eq!(order["order_products"][0]["product"]["id"], cable);
    assert_eq!(order["order_products"][0]["product"]["is_active"], false);

    ctx.cleanup().await;
}
