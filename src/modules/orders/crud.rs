use chrono::Utc;
use sqlx::{MySql, Pool, QueryBuilder};

use super::interface::{OrderError, Result};
use super::model::{LineItemStatus, Method, Order, OrderLineItem};
use super::schema::{CreateOrderRequest, MyOrdersFilter};
use crate::modules::catalog::crud::like_pattern;
use crate::services::pagination::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Delivery,
    Payment,
}

impl MethodKind {
    fn table(&self) -> &'static str {
        match self {
            Self::Delivery => "delivery_methods",
            Self::Payment => "payment_methods",
        }
    }
}

fn push_buyer_filters(qb: &mut QueryBuilder<'_, MySql>, account_id: &str, filter: &MyOrdersFilter) {
    qb.push(" WHERE o.account_id = ").push_bind(account_id.to_string());
    if filter.is_empty() {
        return;
    }

    qb.push(
        " AND EXISTS (SELECT 1 FROM order_line_items li \
         JOIN products p ON p.id = li.product_id \
         JOIN categories sc ON sc.id = p.sub_category_id \
         WHERE li.order_id = o.id",
    );
    if let Some(name) = &filter.product_name {
        qb.push(" AND p.name LIKE ").push_bind(like_pattern(name));
    }
    if let Some(id) = filter.main_category_id {
        qb.push(" AND sc.parent_id = ").push_bind(id);
    }
    if let Some(id) = filter.sub_category_id {
        qb.push(" AND p.sub_category_id = ").push_bind(id);
    }
    qb.push(")");
}

fn push_supplier_filters(qb: &mut QueryBuilder<'_, MySql>, supplier_id: &str, status: Option<LineItemStatus>) {
    qb.push(
        " WHERE EXISTS (SELECT 1 FROM order_line_items li \
         JOIN products p ON p.id = li.product_id \
         WHERE li.order_id = o.id AND p.supplier_id = ",
    )
    .push_bind(supplier_id.to_string());
    if let Some(status) = status {
        qb.push(" AND li.status = ").push_bind(status.as_str());
    }
    qb.push(")");
}

pub struct OrderCrud {
    pool: Pool<MySql>,
}

impl OrderCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // LOOKUP TABLES
    // =========================================================================

    pub async fn methods(&self, kind: MethodKind) -> Result<Vec<Method>> {
        let methods = sqlx::query_as::<_, Method>(&format!("SELECT * FROM {} ORDER BY name, id", kind.table()))
            .fetch_all(&self.pool)
            .await?;
        Ok(methods)
    }

    pub async fn find_method(&self, kind: MethodKind, id: i64) -> Result<Option<Method>> {
        let method = sqlx::query_as::<_, Method>(&format!("SELECT * FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(method)
    }

    pub async fn create_method(&self, kind: MethodKind, name: &str, description: Option<&str>) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
            kind.table()
        ))
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Orders that referenced the method keep existing with a NULL reference.
    pub async fn delete_method(&self, kind: MethodKind, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // CREATION
    // =========================================================================

    /// Writes the order and its line items in one transaction. A missing or inactive
    /// product rolls everything back.
    pub async fn create(&self, account_id: &str, req: &CreateOrderRequest) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (account_id, city, street, house, flat, `index`, total_price,
                                delivery_method_id, payment_method_id, price_for_delivery, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(req.city.trim())
        .bind(req.street.trim())
        .bind(req.house.trim())
        .bind(req.flat.as_deref())
        .bind(req.index.as_deref())
        .bind(req.total_price)
        .bind(req.delivery_method)
        .bind(req.payment_method)
        .bind(req.price_for_delivery)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let order_id = result.last_insert_id() as i64;

        for item in &req.product_list {
            let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM products WHERE id = ? FOR UPDATE")
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?;
            if active != Some(true) {
                tx.rollback().await?;
                return Err(OrderError::ProductUnavailable(item.product_id));
            }

            sqlx::query(
                "INSERT INTO order_line_items (order_id, product_id, quantity, price, status, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(LineItemStatus::Pending.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    // =========================================================================
    // BUYER VIEWS
    // =========================================================================

    pub async fn list_for_buyer(&self, account_id: &str, filter: &MyOrdersFilter, page: Page) -> Result<(Vec<Order>, i64)> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM orders o");
        push_buyer_filters(&mut count, account_id, filter);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut rows = QueryBuilder::<MySql>::new("SELECT o.* FROM orders o");
        push_buyer_filters(&mut rows, account_id, filter);
        rows.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let orders = rows.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok((orders, total))
    }

    pub async fn find_order(&self, id: i64, account_id: &str) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    // =========================================================================
    // SUPPLIER VIEWS
    // =========================================================================

    pub async fn list_for_supplier(
        &self,
        supplier_id: &str,
        status: Option<LineItemStatus>,
        page: Page,
    ) -> Result<(Vec<Order>, i64)> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM orders o");
        push_supplier_filters(&mut count, supplier_id, status);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut rows = QueryBuilder::<MySql>::new("SELECT o.* FROM orders o");
        push_supplier_filters(&mut rows, supplier_id, status);
        rows.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let orders = rows.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok((orders, total))
    }

    pub async fn supplier_order(&self, id: i64, supplier_id: &str) -> Result<Option<Order>> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT o.* FROM orders o");
        push_supplier_filters(&mut qb, supplier_id, None);
        qb.push(" AND o.id = ").push_bind(id);

        let order = qb.build_query_as::<Order>().fetch_optional(&self.pool).await?;
        Ok(order)
    }

    /// Line items of the given orders; with `supplier` only those on that supplier's products.
    pub async fn line_items(&self, order_ids: &[i64], supplier: Option<&str>) -> Result<Vec<OrderLineItem>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT li.* FROM order_line_items li JOIN products p ON p.id = li.product_id WHERE li.order_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in order_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
        if let Some(supplier_id) = supplier {
            qb.push(" AND p.supplier_id = ").push_bind(supplier_id.to_string());
        }
        qb.push(" ORDER BY li.id");

        let items = qb.build_query_as::<OrderLineItem>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn find_supplier_line_item(
        &self,
        order_id: i64,
        line_item_id: i64,
        supplier_id: &str,
    ) -> Result<Option<OrderLineItem>> {
        let item = sqlx::query_as::<_, OrderLineItem>(
            r#"
            SELECT li.* FROM order_line_items li
            JOIN products p ON p.id = li.product_id
            WHERE li.id = ? AND li.order_id = ? AND p.supplier_id = ?
            "#,
        )
        .bind(line_item_id)
        .bind(order_id)
        .bind(supplier_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn set_status(&self, line_item_id: i64, status: LineItemStatus) -> Result<()> {
        sqlx::query("UPDATE order_line_items SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(line_item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Any order by id, for notification texts.
    pub async fn order_by_id(&self, id: i64) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }
}
