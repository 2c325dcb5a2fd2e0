use axum::http::StatusCode;
use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_contact_missing() {
    let ctx = context_or_skip!();

    ctx.server
        .get("/api/v1/sites/contact")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_contact_full_address() {
    let ctx = context_or_skip!();
    let now = chrono::Utc::now();
    sqlx::query(
        r#"
        INSERT INTO contacts (zip_code, city, street, building_number, office_number, phone, email, created_at, updated_at)
        VALUES ('190000', 'Saint Petersburg', 'Nevsky', '28', NULL, '+78121234567', 'info@example.com', ?, ?)
        "#,
    )
    .bind(now)
    .bind(now)
    .execute(&ctx.db)
    .await
    .unwrap();

    let response = ctx.server.get("/api/v1/sites/contact").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["city"], "Saint Petersburg");
    assert_eq!(body["full_address"], "190000, c. Saint Petersburg, st. Nevsky, b. 28");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_partners_have_media_urls() {
    let ctx = context_or_skip!();
    let now = chrono::Utc::now();
    sqlx::query("INSERT INTO partners (image, created_at, updated_at) VALUES ('partners/logo.png', ?, ?)")
        .bind(now)
        .bind(now)
        .execute(&ctx.db)
        .await
        .unwrap();

    let body: Value = ctx.server.get("/api/v1/sites/partners").await.json();

    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["image"], "/media/partners/logo.png");

    ctx.cleanup().await;
}
