use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool};

use super::schema::Window;
use crate::modules::orders::model::LineItemStatus;

/// Aggregates over one supplier's products and the line items that reference them.
pub struct AnalyticsCrud {
    pool: Pool<MySql>,
}

impl AnalyticsCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn income(&self, supplier_id: &str, window: Window) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(li.price * li.quantity), 0) AS DECIMAL(20, 2))
            FROM order_line_items li
            JOIN products p ON p.id = li.product_id
            WHERE p.supplier_id = ? AND li.created_at >= ? AND li.created_at < ?
            "#,
        )
        .bind(supplier_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn product_count(&self, supplier_id: &str, window: Option<Window>) -> Result<i64, sqlx::Error> {
        match window {
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE supplier_id = ?")
                    .bind(supplier_id)
                    .fetch_one(&self.pool)
                    .await
            }
            Some(w) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM products WHERE supplier_id = ? AND created_at >= ? AND created_at < ?",
                )
                .bind(supplier_id)
                .bind(w.start)
                .bind(w.end)
                .fetch_one(&self.pool)
                .await
            }
        }
    }

    /// Distinct orders containing at least one of the supplier's products.
    pub async fn order_count(&self, supplier_id: &str, window: Option<Window>) -> Result<i64, sqlx::Error> {
        let base = "SELECT COUNT(DISTINCT li.order_id) FROM order_line_items li \
                    JOIN products p ON p.id = li.product_id WHERE p.supplier_id = ?";
        match window {
            None => {
                sqlx::query_scalar(base)
                    .bind(supplier_id)
                    .fetch_one(&self.pool)
                    .await
            }
            Some(w) => {
                sqlx::query_scalar(&format!("{base} AND li.created_at >= ? AND li.created_at < ?"))
                    .bind(supplier_id)
                    .bind(w.start)
                    .bind(w.end)
                    .fetch_one(&self.pool)
                    .await
            }
        }
    }

    pub async fn in_progress_count(&self, supplier_id: &str, window: Window) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM order_line_items li
            JOIN products p ON p.id = li.product_id
            WHERE p.supplier_id = ? AND li.status IN (?, ?)
              AND li.created_at >= ? AND li.created_at < ?
            "#,
        )
        .bind(supplier_id)
        .bind(LineItemStatus::Pending.as_str())
        .bind(LineItemStatus::Processing.as_str())
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await
    }

    /// `(day, income, distinct orders)` for each day of the window that had sales.
    pub async fn daily_sales(&self, supplier_id: &str, window: Window) -> Result<Vec<(NaiveDate, Decimal, i64)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT DATE(li.created_at) AS day,
                   CAST(SUM(li.price * li.quantity) AS DECIMAL(20, 2)) AS total_price,
                   COUNT(DISTINCT li.order_id) AS order_count
            FROM order_line_items li
            JOIN products p ON p.id = li.product_id
            WHERE p.supplier_id = ? AND li.created_at >= ? AND li.created_at < ?
            GROUP BY DATE(li.created_at)
            ORDER BY day
            "#,
        )
        .bind(supplier_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
    }
}
