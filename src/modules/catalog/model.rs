use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub supplier_id: Option<String>,
    pub sub_category_id: i64,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price_per_meter: Decimal,
    pub stock: i32,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub number_of_cores: i32,
    pub conductor_material: Option<String>,
    pub cable_cross_section: Option<Decimal>,
    pub outer_insulation_material: Option<String>,
    pub conductor_insulation_material: Option<String>,
    pub outer_sheath_material: Option<String>,
    pub model_version: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its subcategory and that subcategory's parent.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    #[sqlx(flatten)]
    pub product: Product,
    pub sub_category_name: String,
    pub sub_category_description: Option<String>,
    pub main_category_id: Option<i64>,
    pub main_category_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub image: String,
    pub is_main: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductMeterage {
    pub id: i64,
    pub product_id: i64,
    pub value: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
