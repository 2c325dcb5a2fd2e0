use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use cable_market::config::{init_db, Config, DbPool};
use cable_market::services::notify::{Notifier, NotifyError};
use cable_market::{create_app, AppState};
use serde_json::{json, Value};

/// Keeps every outgoing message so tests can read links and texts back.
#[derive(Default)]
pub struct RecordingNotifier {
    pub emails: Mutex<Vec<(String, String, String)>>,
    pub sms: Mutex<Vec<(String, String)>>,
    /// When set, every SMS is rejected as if the gateway were down.
    pub fail_sms: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.emails
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }

    async fn send_sms(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail_sms.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 503,
                body: "gateway unavailable".to_string(),
            });
        }
        self.sms.lock().unwrap().push((phone.to_string(), body.to_string()));
        Ok(())
    }
}

/// Builds a `TestContext` or returns from the test when no database is configured.
macro_rules! context_or_skip {
    () => {
        match $crate::common::TestContext::new().await {
            Some(ctx) => ctx,
            None => {
                eprintln!("skipping: set TEST_DATABASE_URL to run database tests");
                return;
            }
        }
    };
}

#[allow(dead_code)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub token: String,
}

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: DbPool,
    pub notifier: Arc<RecordingNotifier>,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Option<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .ok()?;
        let db = match init_db(&database_url).await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skipping: test database unavailable: {e}");
                return None;
            }
        };

        let config = Config::with_defaults(database_url, "test-secret-key-for-testing-only");
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(db.clone(), &config, notifier.clone()).expect("metrics registry");
        let server = TestServer::new(create_app(Arc::new(state))).expect("Failed to create test server");

        let ctx = Self { server, db, notifier };
        ctx.cleanup().await;
        Some(ctx)
    }

    pub async fn cleanup(&self) {
        // Children first so foreign keys never block a delete
        for table in [
            "order_line_items",
            "orders",
            "delivery_methods",
            "payment_methods",
            "favorites",
            "product_meterages",
            "product_images",
            "products",
            "categories",
            "company_documents",
            "companies",
            "email_verification_tokens",
            "password_reset_tokens",
            "accounts",
            "contacts",
            "partners",
            "inquiries",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&self.db)
                .await
                .ok();
        }
    }

    /// Registers a buyer (or a supplier with a company) and logs in.
    pub async fn signup(&self, supplier: bool) -> Account {
        let email = test_email();
        let phone = test_phone();
        let path = if supplier {
            "/api/v1/accounts/register-supplier"
        } else {
            "/api/v1/accounts/register"
        };
        let mut body = json!({
            "email": email,
            "first_name": "Ivan",
            "last_name": "Petrov",
            "phone": phone,
            "password": test_password(),
            "password_confirm": test_password(),
        });
        if supplier {
            body["name_company"] = json!("Kabel LLC");
        }
        self.server.post(path).json(&body).await.assert_status_success();

        let login: Value = self
            .server
            .post("/api/v1/accounts/login")
            .json(&json!({ "email_or_phone": email, "password": test_password() }))
            .await
            .json();

        Account {
            id: login["user"]["id"].as_str().unwrap().to_string(),
            token: login["access_token"].as_str().unwrap().to_string(),
            email,
            phone,
        }
    }

    pub async fn staff(&self) -> Account {
        let account = self.signup(false).await;
        sqlx::query("UPDATE accounts SET is_staff = TRUE WHERE id = ?")
            .bind(&account.id)
            .execute(&self.db)
            .await
            .unwrap();
        account
    }

    /// Inserts a main category with one sub category. Returns `(main_id, sub_id)`.
    pub async fn seed_categories(&self, name: &str) -> (i64, i64) {
        let now = chrono::Utc::now();
        let main = sqlx::query(
            "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?, 'main', ?, ?)",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .unwrap()
        .last_insert_id() as i64;

        let sub = sqlx::query(
            "INSERT INTO categories (name, description, parent_id, created_at, updated_at) VALUES (?, 'sub', ?, ?, ?)",
        )
        .bind(format!("{name} sub"))
        .bind(main)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .unwrap()
        .last_insert_id() as i64;

        (main, sub)
    }

    pub async fn seed_product(&self, sub_category_id: i64, supplier_id: Option<&str>, name: &str, price: &str) -> i64 {
        let now = chrono::Utc::now();
        sqlx::query(
            r#"
            INSERT INTO products (supplier_id, sub_category_id, name, sku, price_per_meter, stock,
                                  manufacturer, number_of_cores, conductor_material, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, CAST(? AS DECIMAL(10, 2)), 100, 'Sevkabel', 3, 'copper', TRUE, ?, ?)
            "#,
        )
        .bind(supplier_id)
        .bind(sub_category_id)
        .bind(name)
        .bind(format!("SKU-{}", uuid::Uuid::new_v4()))
        .bind(price)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .unwrap()
        .last_insert_id() as i64
    }

    pub async fn deactivate_product(&self, id: i64) {
        sqlx::query("UPDATE products SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .unwrap();
    }

    /// `table` is `delivery_methods` or `payment_methods`.
    pub async fn seed_method(&self, table: &str, name: &str) -> i64 {
        let now = chrono::Utc::now();
        sqlx::query(&format!(
            "INSERT INTO {table} (name, description, created_at, updated_at) VALUES (?, NULL, ?, ?)"
        ))
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .unwrap()
        .last_insert_id() as i64
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db)
            .await
            .unwrap()
    }

    /// Token from the `?token=` link in the newest email sent to `to`.
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        let emails = self.notifier.emails.lock().unwrap();
        let (_, _, body) = emails.iter().rev().find(|(addr, _, _)| addr == to)?;
        let start = body.find("token=")? + "token=".len();
        Some(body[start..].split_whitespace().next()?.to_string())
    }

    pub fn sms_to(&self, phone: &str) -> Vec<String> {
        self.notifier
            .sms
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == phone)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

/// Unique Russian-style mobile number, already normalized.
#[allow(dead_code)]
pub fn test_phone() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("+7{n:010}")
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}

/// Minimal valid order body for the given `(product_id, quantity, price)` lines.
#[allow(dead_code)]
pub fn order_payload(lines: &[(i64, i32, &str)], delivery: i64, payment: i64) -> Value {
    let product_list: Vec<Value> = lines
        .iter()
        .map(|(id, quantity, price)| json!({ "product_id": id, "quantity": quantity, "price": price }))
        .collect();
    json!({
        "product_list": product_list,
        "city": "Moscow",
        "street": "Tverskaya",
        "house": "7",
        "flat": "12",
        "index": "125009",
        "total_price": "169.00",
        "delivery_method": delivery,
        "payment_method": payment,
        "price_for_delivery": "500.00"
    })
}
