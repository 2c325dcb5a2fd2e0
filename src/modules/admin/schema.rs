use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::interface::AdminError;
use crate::modules::accounts::model::{Account, Role};
use crate::modules::catalog::model::{Category, ProductImage, ProductMeterage};
use crate::services::storage::MediaStorage;

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("min").with_message(Cow::from("Must not be negative")));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AccountListQuery {
    pub role: Option<String>,
}

impl AccountListQuery {
    pub fn role(&self) -> Result<Option<Role>, AdminError> {
        match self.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => Ok(None),
            Some(raw) => Role::try_from(raw.to_ascii_lowercase())
                .map(Some)
                .map_err(|_| AdminError::InvalidRole(raw.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminAccountResponse {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AdminAccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            phone: a.phone,
            first_name: a.first_name,
            last_name: a.last_name,
            role: a.role,
            is_staff: a.is_staff,
            is_active: a.is_active,
            is_email_verified: a.is_email_verified,
            created_at: a.created_at,
        }
    }
}

// =============================================================================
// CATEGORIES
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Absent for a main category, a main category id for a sub category.
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponse {
    pub fn new(c: Category, storage: &MediaStorage) -> Self {
        Self {
            id: c.id,
            image: storage.url_opt(c.image.as_deref()),
            name: c.name,
            description: c.description,
            parent_id: c.parent_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    pub sub_category_id: i64,
    pub supplier_id: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "SKU is required"))]
    pub sku: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub price_per_meter: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
    #[validate(length(max = 255))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 255))]
    pub country_of_origin: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub number_of_cores: i32,
    #[validate(length(max = 255))]
    pub conductor_material: Option<String>,
    pub cable_cross_section: Option<Decimal>,
    #[validate(length(max = 255))]
    pub outer_insulation_material: Option<String>,
    #[validate(length(max = 255))]
    pub conductor_insulation_material: Option<String>,
    #[validate(length(max = 255))]
    pub outer_sheath_material: Option<String>,
    #[validate(length(max = 255))]
    pub model_version: Option<String>,
    #[validate(length(max = 100))]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminImageResponse {
    pub id: i64,
    pub product_id: i64,
    pub image: String,
    pub is_main: bool,
    pub order: i32,
}

impl AdminImageResponse {
    pub fn new(i: ProductImage, storage: &MediaStorage) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            image: storage.url(&i.image),
            is_main: i.is_main,
            order: i.sort_order,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MeterageRequest {
    #[validate(range(min = 1, message = "Meterage must be positive"))]
    pub value: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminMeterageResponse {
    pub id: i64,
    pub product_id: i64,
    pub value: i32,
    pub is_active: bool,
}

impl From<ProductMeterage> for AdminMeterageResponse {
    fn from(m: ProductMeterage) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            value: m.value,
            is_active: m.is_active,
        }
    }
}
