use chrono::Utc;
use sqlx::{MySql, Pool};

use super::schema::{CategoryRequest, MeterageRequest, ProductRequest};
use crate::modules::catalog::model::{ProductImage, ProductMeterage};

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Catalog writes. Reads go through `CatalogCrud`.
pub struct AdminCrud {
    pool: Pool<MySql>,
}

impl AdminCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CATEGORIES
    // =========================================================================

    pub async fn create_category(&self, req: &CategoryRequest) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (name, description, parent_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(req.name.trim())
        .bind(trimmed(&req.description))
        .bind(req.parent_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn update_category(&self, id: i64, req: &CategoryRequest) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET name = ?, description = ?, parent_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(req.name.trim())
        .bind(trimmed(&req.description))
        .bind(req.parent_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_category_image(&self, id: i64, image: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE categories SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn category_has_children(&self, id: i64) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Cascades to sub categories and their products.
    pub async fn delete_category(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // PRODUCTS
    // =========================================================================

    pub async fn create_product(&self, req: &ProductRequest) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (supplier_id, sub_category_id, name, sku, description, price_per_meter, stock,
                                  manufacturer, country_of_origin, number_of_cores, conductor_material,
                                  cable_cross_section, outer_insulation_material, conductor_insulation_material,
                                  outer_sheath_material, model_version, color, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trimmed(&req.supplier_id))
        .bind(req.sub_category_id)
        .bind(req.name.trim())
        .bind(req.sku.trim())
        .bind(trimmed(&req.description))
        .bind(req.price_per_meter)
        .bind(req.stock)
        .bind(trimmed(&req.manufacturer))
        .bind(trimmed(&req.country_of_origin))
        .bind(req.number_of_cores)
        .bind(trimmed(&req.conductor_material))
        .bind(req.cable_cross_section)
        .bind(trimmed(&req.outer_insulation_material))
        .bind(trimmed(&req.conductor_insulation_material))
        .bind(trimmed(&req.outer_sheath_material))
        .bind(trimmed(&req.model_version))
        .bind(trimmed(&req.color))
        .bind(req.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn update_product(&self, id: i64, req: &ProductRequest) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE products SET supplier_id = ?, sub_category_id = ?, name = ?, sku = ?, description = ?,
                price_per_meter = ?, stock = ?, manufacturer = ?, country_of_origin = ?, number_of_cores = ?,
                conductor_material = ?, cable_cross_section = ?, outer_insulation_material = ?,
                conductor_insulation_material = ?, outer_sheath_material = ?, model_version = ?, color = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(trimmed(&req.supplier_id))
        .bind(req.sub_category_id)
        .bind(req.name.trim())
        .bind(req.sku.trim())
        .bind(trimmed(&req.description))
        .bind(req.price_per_meter)
        .bind(req.stock)
        .bind(trimmed(&req.manufacturer))
        .bind(trimmed(&req.country_of_origin))
        .bind(req.number_of_cores)
        .bind(trimmed(&req.conductor_material))
        .bind(req.cable_cross_section)
        .bind(trimmed(&req.outer_insulation_material))
        .bind(trimmed(&req.conductor_insulation_material))
        .bind(trimmed(&req.outer_sheath_material))
        .bind(trimmed(&req.model_version))
        .bind(trimmed(&req.color))
        .bind(req.is_active)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Products stay referenced by past orders, so deleting only hides them.
    pub async fn deactivate_product(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE products SET is_active = FALSE, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // IMAGES
    // =========================================================================

    /// A new main image demotes the previous one.
    pub async fn add_image(&self, product_id: i64, path: &str, is_main: bool, order: i32) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        if is_main {
            sqlx::query("UPDATE product_images SET is_main = FALSE WHERE product_id = ?")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }
        let result = sqlx::query(
            "INSERT INTO product_images (product_id, image, is_main, sort_order, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(path)
        .bind(is_main)
        .bind(order)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_image(&self, product_id: i64, image_id: i64) -> Result<Option<ProductImage>, sqlx::Error> {
        sqlx::query_as::<_, ProductImage>("SELECT * FROM product_images WHERE id = ? AND product_id = ?")
            .bind(image_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete_image(&self, image_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM product_images WHERE id = ?")
            .bind(image_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // METERAGES
    // =========================================================================

    pub async fn add_meterage(&self, product_id: i64, req: &MeterageRequest) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO product_meterages (product_id, value, is_active, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(req.value)
        .bind(req.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_meterage(&self, id: i64) -> Result<Option<ProductMeterage>, sqlx::Error> {
        sqlx::query_as::<_, ProductMeterage>("SELECT * FROM product_meterages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete_meterage(&self, product_id: i64, meterage_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_meterages WHERE id = ? AND product_id = ?")
            .bind(meterage_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
