use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::Value;
use serial_test::serial;

use crate::common::order_payload;

#[tokio::test]
#[serial]
async fn test_dashboard_counts_supplier_sales() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;
    let supplier = ctx.signup(true).await;
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let cable = ctx.seed_product(sub, Some(&supplier.id), "VVGng 3x2.5", "84.50").await;
    ctx.seed_product(sub, Some(&supplier.id), "VVGng 3x1.5", "61.00").await;
    let delivery = ctx.seed_method("delivery_methods", "Courier").await;
    let payment = ctx.seed_method("payment_methods", "Card").await;

    ctx.server
        .post("/api/v1/orders/create")
        .authorization_bearer(&buyer.token)
        .json(&order_payload(&[(cable, 2, "84.50")], delivery, payment))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .get("/api/v1/orders/supplier/analytics")
        .authorization_bearer(&supplier.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_income"]["total"], "169.00");
    assert_eq!(body["total_income"]["change_type"], "increase");
    assert_eq!(body["active_products"]["total"], 2);
    assert_eq!(body["active_products"]["this_month"], 2);
    assert_eq!(body["orders_total"]["total"], 1);
    assert_eq!(body["orders_in_progress"]["total"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_sales_report_is_zero_filled() {
    let ctx = context_or_skip!();
    let buyer = ctx.signup(false).await;
    let supplier = ctx.signup(true).await;
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let cable = ctx.seed_product(sub, Some(&supplier.id), "VVGng 3x2.5", "84.50").await;
    let delivery = ctx.seed_method("delivery_methods", "Courier").await;
    let payment = ctx.seed_method("payment_methods", "Card").await;

    ctx.server
        .post("/api/v1/orders/create")
        .authorization_bearer(&buyer.token)
        .json(&order_payload(&[(cable, 2, "84.50")], delivery, payment))
        .await
        .assert_status(StatusCode::CREATED);

    let today = Utc::now().date_naive();
    let response = ctx
        .server
        .get("/api/v1/orders/supplier/analytics/sales")
        .authorization_bearer(&supplier.token)
        .add_query_param("year", today.year())
        .add_query_param("month", today.month())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let days = body["days_in_month"].as_u64().unwrap() as usize;
    let sales = body["sales_data"].as_array().unwrap();
    assert_eq!(sales.len(), days);
    assert_eq!(body["total_orders"], 1);
    assert_eq!(body["total_sales"], "169.00");

    let today_row = &sales[today.day0() as usize];
    assert_eq!(today_row["date"], today.format("%Y-%m-%d").to_string());
    assert_eq!(today_row["order_count"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_sales_report_rejects_bad_month() {
    let ctx = context_or_skip!();
    let supplier = ctx.signup(true).await;

    ctx.server
        .get("/api/v1/orders/supplier/analytics/sales")
        .authorization_bearer(&supplier.token)
        .add_query_param("month", 13)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
