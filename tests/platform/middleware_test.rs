use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::{config, server, server_with};

#[tokio::test]
async fn test_root_banner() {
    let server = server();

    let response = server.get("/").await;

    response.assert_status_ok();
    response.assert_text("Cable Market API");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let server = server();

    for response in [server.get("/").await, server.get("/no-such-route").await] {
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(response.header("referrer-policy"), "same-origin");
        assert!(response
            .header("strict-transport-security")
            .to_str()
            .unwrap()
            .starts_with("max-age="));
    }
}

#[tokio::test]
async fn test_protected_routes_reject_missing_or_bad_tokens() {
    let server = server();

    for path in ["/api/v1/accounts/user", "/api/v1/orders/my-orders", "/api/v1/products/favourites"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Authentication credentials were not provided");

        server
            .get(path)
            .authorization_bearer("garbage.token.value")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    server
        .get("/api/v1/admin/accounts")
        .add_header("authorization", "Basic dXNlcjpwYXNz")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit_kicks_in_after_burst() {
    let mut cfg = config();
    cfg.rate_limit_burst = 3;
    let server = server_with(cfg);

    for _ in 0..3 {
        server.get("/").await.assert_status_ok();
    }

    let response = server.get("/").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"], "Too many requests");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut cfg = config();
    cfg.max_upload_bytes = 16;
    let server = server_with(cfg);

    let response = server
        .post("/api/v1/sites/request")
        .json(&json!({
            "name": "x".repeat(200),
            "phone": "+79990001122",
            "privacy_policy_agreed": true
        }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_malformed_json_is_a_client_error() {
    let server = server();

    let response = server
        .post("/api/v1/accounts/login")
        .content_type("application/json")
        .text("{not json")
        .await;

    assert!(response.status_code().is_client_error());
}
