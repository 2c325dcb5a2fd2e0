use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, QueryBuilder};

use super::model::{Category, ProductImage, ProductMeterage, ProductRow};
use super::schema::{CategoryFilter, ProductFilter};
use crate::services::pagination::Page;

pub(crate) const PRODUCT_SELECT: &str = r#"
    SELECT p.*, sc.name AS sub_category_name, sc.description AS sub_category_description,
           mc.id AS main_category_id, mc.name AS main_category_name
    FROM products p
    JOIN categories sc ON sc.id = p.sub_category_id
    LEFT JOIN categories mc ON mc.id = sc.parent_id
"#;

const PRODUCT_FROM: &str = r#"
    FROM products p
    JOIN categories sc ON sc.id = p.sub_category_id
    LEFT JOIN categories mc ON mc.id = sc.parent_id
"#;

/// `%term%` with LIKE wildcards in the term escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_product_filters(qb: &mut QueryBuilder<'_, MySql>, filter: &ProductFilter) {
    qb.push(" WHERE p.is_active = TRUE");

    if let Some(id) = filter.main_category_id {
        qb.push(" AND sc.parent_id = ").push_bind(id);
    }
    if let Some(id) = filter.sub_category_id {
        qb.push(" AND p.sub_category_id = ").push_bind(id);
    }
    for (column, values) in &filter.any_of {
        qb.push(format!(" AND p.{column} IN ("));
        let mut list = qb.separated(", ");
        for value in values {
            list.push_bind(value.clone());
        }
        list.push_unseparated(")");
    }
    if let Some(cores) = filter.number_of_cores {
        qb.push(" AND p.number_of_cores = ").push_bind(cores);
    }
    if let Some(section) = filter.cable_cross_section {
        qb.push(" AND p.cable_cross_section = ").push_bind(section);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price_per_meter >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price_per_meter <= ").push_bind(max);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (p.name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description LIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.sku LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if filter.popular {
        qb.push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.product_id = p.id)");
    }
}

pub struct CatalogCrud {
    pool: Pool<MySql>,
}

impl CatalogCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CATEGORIES
    // =========================================================================

    pub async fn find_category(&self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Main categories with their (optionally filtered) subcategories, by name.
    pub async fn main_categories(&self, filter: &CategoryFilter) -> Result<Vec<(Category, Vec<Category>)>, sqlx::Error> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM categories c WHERE c.parent_id IS NULL");
        if let Some(id) = filter.main_category_id {
            qb.push(" AND c.id = ").push_bind(id);
        }
        if let Some(name) = &filter.main_category {
            qb.push(" AND c.name LIKE ").push_bind(like_pattern(name));
        }
        if let Some(name) = &filter.sub_category {
            qb.push(" AND EXISTS (SELECT 1 FROM categories s WHERE s.parent_id = c.id AND s.name LIKE ")
                .push_bind(like_pattern(name))
                .push(")");
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            qb.push(" AND (c.name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM categories s WHERE s.parent_id = c.id AND s.name LIKE ")
                .push_bind(pattern)
                .push("))");
        }
        qb.push(" ORDER BY c.name, c.id");

        let mains = qb.build_query_as::<Category>().fetch_all(&self.pool).await?;
        if mains.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM categories WHERE parent_id IN (");
        let mut ids = qb.separated(", ");
        for main in &mains {
            ids.push_bind(main.id);
        }
        ids.push_unseparated(")");
        if let Some(name) = &filter.sub_category {
            qb.push(" AND name LIKE ").push_bind(like_pattern(name));
        }
        qb.push(" ORDER BY name, id");

        let mut subs: HashMap<i64, Vec<Category>> = HashMap::new();
        for sub in qb.build_query_as::<Category>().fetch_all(&self.pool).await? {
            if let Some(parent) = sub.parent_id {
                subs.entry(parent).or_default().push(sub);
            }
        }

        Ok(mains
            .into_iter()
            .map(|main| {
                let children = subs.remove(&main.id).unwrap_or_default();
                (main, children)
            })
            .collect())
    }

    // =========================================================================
    // PRODUCTS
    // =========================================================================

    pub async fn list_products(&self, filter: &ProductFilter, page: Page) -> Result<(Vec<ProductRow>, i64), sqlx::Error> {
        let mut count = QueryBuilder::<MySql>::new(format!("SELECT COUNT(*) {PRODUCT_FROM}"));
        push_product_filters(&mut count, filter);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut rows = QueryBuilder::<MySql>::new(PRODUCT_SELECT);
        push_product_filters(&mut rows, filter);
        if filter.popular && !filter.newest_first {
            rows.push(" ORDER BY (SELECT COUNT(*) FROM favorites f WHERE f.product_id = p.id) DESC, p.created_at DESC, p.id DESC");
        } else {
            rows.push(" ORDER BY p.created_at DESC, p.id DESC");
        }
        rows.push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let products = rows.build_query_as::<ProductRow>().fetch_all(&self.pool).await?;
        Ok((products, total))
    }

    pub async fn find_product(&self, id: i64) -> Result<Option<ProductRow>, sqlx::Error> {
        sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_active_product(&self, id: i64) -> Result<Option<ProductRow>, sqlx::Error> {
        Ok(self.find_product(id).await?.filter(|row| row.product.is_active))
    }

    /// Products by id regardless of `is_active`; orders keep pointing at retired products.
    pub async fn products_by_ids(&self, product_ids: &[i64]) -> Result<Vec<ProductRow>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<MySql>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.id IN (");
        let mut ids = qb.separated(", ");
        for id in product_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
        qb.build_query_as().fetch_all(&self.pool).await
    }

    /// Active products sharing a subcategory, main category, manufacturer or conductor
    /// material with `row`, topped up with the newest active products.
    pub async fn similar_products(&self, row: &ProductRow, limit: i64) -> Result<Vec<ProductRow>, sqlx::Error> {
        let product = &row.product;
        let mut qb = QueryBuilder::<MySql>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.is_active = TRUE AND p.id <> ")
            .push_bind(product.id)
            .push(" AND (p.sub_category_id = ")
            .push_bind(product.sub_category_id);
        if let Some(main_id) = row.main_category_id {
            qb.push(" OR sc.parent_id = ").push_bind(main_id);
        }
        if let Some(manufacturer) = product.manufacturer.as_deref().filter(|m| !m.is_empty()) {
            qb.push(" OR p.manufacturer = ").push_bind(manufacturer.to_string());
        }
        if let Some(material) = product.conductor_material.as_deref().filter(|m| !m.is_empty()) {
            qb.push(" OR p.conductor_material = ").push_bind(material.to_string());
        }
        qb.push(") ORDER BY p.created_at DESC, p.id DESC LIMIT ").push_bind(limit);

        let mut similar = qb.build_query_as::<ProductRow>().fetch_all(&self.pool).await?;

        let remaining = limit - similar.len() as i64;
        if remaining > 0 {
            let mut qb = QueryBuilder::<MySql>::new(PRODUCT_SELECT);
            qb.push(" WHERE p.is_active = TRUE AND p.id NOT IN (");
            let mut ids = qb.separated(", ");
            ids.push_bind(product.id);
            for s in &similar {
                ids.push_bind(s.product.id);
            }
            ids.push_unseparated(")");
            qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ").push_bind(remaining);

            similar.extend(qb.build_query_as::<ProductRow>().fetch_all(&self.pool).await?);
        }

        Ok(similar)
    }

    pub async fn images_for(&self, product_ids: &[i64]) -> Result<Vec<ProductImage>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM product_images WHERE product_id IN (");
        let mut ids = qb.separated(", ");
        for id in product_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY is_main DESC, sort_order, created_at, id");
        qb.build_query_as().fetch_all(&self.pool).await
    }

    pub async fn meterages_for(&self, product_ids: &[i64]) -> Result<Vec<ProductMeterage>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM product_meterages WHERE product_id IN (");
        let mut ids = qb.separated(", ");
        for id in product_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY value");
        qb.build_query_as().fetch_all(&self.pool).await
    }

    // =========================================================================
    // FILTER FACETS
    // =========================================================================

    pub async fn distinct_text(&self, column: &'static str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(&format!(
            "SELECT DISTINCT {column} FROM products \
             WHERE is_active = TRUE AND {column} IS NOT NULL AND {column} <> '' ORDER BY {column}"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn distinct_cores(&self) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT number_of_cores FROM products WHERE is_active = TRUE ORDER BY number_of_cores")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn distinct_cross_sections(&self) -> Result<Vec<Decimal>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT cable_cross_section FROM products \
             WHERE is_active = TRUE AND cable_cross_section IS NOT NULL ORDER BY cable_cross_section",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn price_range(&self) -> Result<(Option<Decimal>, Option<Decimal>), sqlx::Error> {
        sqlx::query_as("SELECT MIN(price_per_meter), MAX(price_per_meter) FROM products WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await
    }

    // =========================================================================
    // FAVOURITES
    // =========================================================================

    pub async fn favourite_ids(&self, account_id: &str, product_ids: &[i64]) -> Result<HashSet<i64>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let mut qb = QueryBuilder::<MySql>::new("SELECT product_id FROM favorites WHERE account_id = ");
        qb.push_bind(account_id.to_string()).push(" AND product_id IN (");
        let mut ids = qb.separated(", ");
        for id in product_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");

        let found: Vec<(i64,)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(found.into_iter().map(|(id,)| id).collect())
    }

    /// Returns `true` when a new row was written, `false` when it already existed.
    pub async fn add_favourite(&self, account_id: &str, product_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT IGNORE INTO favorites (account_id, product_id, created_at) VALUES (?, ?, ?)")
            .bind(account_id)
            .bind(product_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn remove_favourite(&self, account_id: &str, product_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE account_id = ? AND product_id = ?")
            .bind(account_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn favourite_products(&self, account_id: &str) -> Result<Vec<ProductRow>, sqlx::Error> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} JOIN favorites f ON f.product_id = p.id \
             WHERE f.account_id = ? AND p.is_active = TRUE ORDER BY f.created_at DESC, f.id DESC"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
    }
}
