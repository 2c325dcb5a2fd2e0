use axum::http::StatusCode;
use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_list_products_hides_inactive() {
    let ctx = context_or_skip!();
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let visible = ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;
    let hidden = ctx.seed_product(sub, None, "Retired cable", "10.00").await;
    ctx.deactivate_product(hidden).await;

    let response = ctx.server.get("/api/v1/products/products").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], visible);
    assert_eq!(body["results"][0]["is_favourite"], false);

    ctx.server
        .get(&format!("/api/v1/products/products/{hidden}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_list_products_filters_and_paging() {
    let ctx = context_or_skip!();
    let (main, sub) = ctx.seed_categories("Power cables").await;
    let (_, other_sub) = ctx.seed_categories("Signal cables").await;
    ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;
    ctx.seed_product(sub, None, "VVGng 3x1.5", "61.00").await;
    ctx.seed_product(other_sub, None, "UTP cat5e", "25.00").await;

    let by_main: Value = ctx
        .server
        .get("/api/v1/products/products")
        .add_query_param("main_category_id", main)
        .await
        .json();
    assert_eq!(by_main["count"], 2);

    let by_price: Value = ctx
        .server
        .get("/api/v1/products/products")
        .add_query_param("min_price", "30")
        .add_query_param("max_price", "70")
        .await
        .json();
    assert_eq!(by_price["count"], 1);
    assert_eq!(by_price["results"][0]["name"], "VVGng 3x1.5");

    let by_search: Value = ctx
        .server
        .get("/api/v1/products/products")
        .add_query_param("search", "utp")
        .await
        .json();
    assert_eq!(by_search["count"], 1);

    let paged: Value = ctx
        .server
        .get("/api/v1/products/products")
        .add_query_param("limit", 2)
        .add_query_param("page", 2)
        .await
        .json();
    assert_eq!(paged["count"], 3);
    assert_eq!(paged["total_pages"], 2);
    assert_eq!(paged["results"].as_array().unwrap().len(), 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_product_detail() {
    let ctx = context_or_skip!();
    let (main, sub) = ctx.seed_categories("Power cables").await;
    let id = ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;

    let response = ctx.server.get(&format!("/api/v1/products/products/{id}")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["price_per_meter"], "84.50");
    assert_eq!(body["sub_category"]["id"], sub);
    assert_eq!(body["sub_category"]["main_category"]["id"], main);
    assert_eq!(body["images"], serde_json::json!([]));

    ctx.server
        .get("/api/v1/products/products/999999")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_similar_products_exclude_the_product_itself() {
    let ctx = context_or_skip!();
    let (_, sub) = ctx.seed_categories("Power cables").await;
    let (_, other_sub) = ctx.seed_categories("Signal cables").await;
    let id = ctx.seed_product(sub, None, "VVGng 3x2.5", "84.50").await;
    let sibling = ctx.seed_product(sub, None, "VVGng 3x1.5", "61.00").await;
    ctx.seed_product(other_sub, None, "UTP cat5e", "25.00").await;

    let response = ctx
        .server
        .get(&format!("/api/v1/products/products/{id}/similar"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<i64> = body.as_array().unwrap().iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&sibling));
    assert!(!ids.contains(&id));

    let limited: Value = ctx
        .server
        .get(&format!("/api/v1/products/products/{id}/similar"))
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(limited.as_array().unwrap().len(), 1);

    ctx.cleanup().await;
}
