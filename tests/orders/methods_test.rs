use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_methods_are_listed_by_name() {
    let ctx = context_or_skip!();
    ctx.seed_method("delivery_methods", "Pickup").await;
    ctx.seed_method("delivery_methods", "Courier").await;
    ctx.seed_method("payment_methods", "Card").await;

    let delivery: Value = ctx.server.get("/api/v1/orders/delivery-methods").await.json();
    let names: Vec<&str> = delivery["delivery_methods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Courier", "Pickup"]);

    let payment: Value = ctx.server.get("/api/v1/orders/payment-methods").await.json();
    assert_eq!(payment["payment_methods"][0]["name"], "Card");

    ctx.cleanup().await;
}
