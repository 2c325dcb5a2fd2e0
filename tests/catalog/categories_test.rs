use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_main_categories_with_subcategories() {
    let ctx = context_or_skip!();
    let (power, power_sub) = ctx.seed_categories("Power cables").await;
    ctx.seed_categories("Signal cables").await;

    let response = ctx.server.get("/api/v1/products/main-categories").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let tree = body.as_array().unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0]["id"], power);
    assert_eq!(tree[0]["sub_categories"][0]["id"], power_sub);
    assert_eq!(tree[0]["sub_categories"][0]["name"], "Power cables sub");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_main_categories_filters() {
    let ctx = context_or_skip!();
    let (power, _) = ctx.seed_categories("Power cables").await;
    ctx.seed_categories("Signal cables").await;

    let by_id: Value = ctx
        .server
        .get("/api/v1/products/main-categories")
        .add_query_param("main_category_id", power)
        .await
        .json();
    assert_eq!(by_id.as_array().unwrap().len(), 1);

    let by_search: Value = ctx
        .server
        .get("/api/v1/products/main-categories")
        .add_query_param("search", "signal")
        .await
        .json();
    assert_eq!(by_search[0]["name"], "Signal cables");

    // Junk ids are ignored rather than rejected
    let junk: Value = ctx
        .server
        .get("/api/v1/products/main-categories")
        .add_query_param("main_category_id", "abc")
        .await
        .json();
    assert_eq!(junk.as_array().unwrap().len(), 2);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_filter_data_lists_facets() {
    let ctx = context_or_skip!();
    let (_, sub) = ctx.seed_categories("Power cables").await;
    ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;
    ctx.seed_product(sub, None, "VVGng 3x1.5", "61.00").await;

    let response = ctx.server.get("/api/v1/products/products/filter-data").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["manufacturers"], serde_json::json!(["Sevkabel"]));
    assert_eq!(body["number_of_cores"], serde_json::json!([3]));
    assert_eq!(body["main_categories"].as_array().unwrap().len(), 1);
    assert_eq!(body["sub_categories"][0]["id"], sub);
    assert_eq!(body["price_range"]["min"], "61.00");
    assert_eq!(body["price_range"]["max"], "84.50");

    ctx.cleanup().await;
}
