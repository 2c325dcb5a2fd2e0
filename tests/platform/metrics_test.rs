use crate::server;

#[tokio::test]
async fn test_metrics_endpoint_exports_prometheus_text() {
    let server = server();
    server.get("/").await.assert_status_ok();
    server.get("/api/v1/orders/42").await;

    let response = server.get("/metrics").await;

    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("# TYPE market_http_requests_total counter"));
    assert!(text.contains("market_db_connections_active"));
    assert!(text.contains(r#"path="/""#));
}

#[tokio::test]
async fn test_metrics_collapse_ids_in_paths() {
    let server = server();
    server.get("/api/v1/orders/17").await;
    server.get("/api/v1/orders/18").await;

    let text = server.get("/metrics").await.text();

    assert!(!text.contains("/api/v1/orders/17"));
    assert!(!text.contains("/api/v1/orders/18"));
}
