use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_inquiry_as_json() {
    let ctx = context_or_skip!();

    let response = ctx
        .server
        .post("/api/v1/sites/request")
        .json(&json!({
            "name": "  Sergey  ",
            "phone": "+79990001122",
            "email": "",
            "comment": "Need 500 m of VVGng",
            "privacy_policy_agreed": true
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_i64().unwrap();

    let (name, email): (String, Option<String>) = sqlx::query_as("SELECT name, email FROM inquiries WHERE id = ?")
        .bind(id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(name, "Sergey");
    assert_eq!(email, None);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_inquiry_requires_privacy_consent() {
    let ctx = context_or_skip!();

    let response = ctx
        .server
        .post("/api/v1/sites/request")
        .json(&json!({ "name": "Sergey", "phone": "+79990001122" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["fields"]["privacy_policy_agreed"].is_array());
    assert_eq!(ctx.count("inquiries").await, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_inquiry_as_multipart_with_file() {
    let ctx = context_or_skip!();

    let form = MultipartForm::new()
        .add_text("name", "Marina")
        .add_text("phone", "+79990003344")
        .add_text("privacy_policy_agreed", "true")
        .add_part(
            "file",
            Part::bytes(b"item;qty\nVVGng;500\n".to_vec())
                .file_name("cable_list.csv")
                .mime_type("text/csv"),
        );

    let response = ctx.server.post("/api/v1/sites/request").multipart(form).await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();

    let file: Option<String> = sqlx::query_scalar("SELECT file FROM inquiries WHERE id = ?")
        .bind(body["id"].as_i64().unwrap())
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    let file = file.expect("stored file path");
    assert!(file.starts_with("requests/files/"));
    assert!(file.ends_with(".csv"));

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_inquiry_rejects_bad_email() {
    let ctx = context_or_skip!();

    ctx.server
        .post("/api/v1/sites/request")
        .json(&json!({
            "name": "Sergey",
            "phone": "+79990001122",
            "email": "not-an-email",
            "privacy_policy_agreed": true
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
