use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{Category, ProductImage, ProductMeterage, ProductRow};
use crate::services::storage::{parse_flag, MediaStorage};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a numeric query value; anything unparseable counts as absent.
fn number<T: FromStr>(value: &Option<String>) -> Option<T> {
    non_empty(value).and_then(|v| v.parse().ok())
}

fn csv(value: &Option<String>) -> Vec<String> {
    non_empty(value)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// CATEGORIES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub main_category_id: Option<String>,
    pub main_category: Option<String>,
    pub sub_category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct CategoryFilter {
    pub main_category_id: Option<i64>,
    pub main_category: Option<String>,
    pub sub_category: Option<String>,
    pub search: Option<String>,
}

impl CategoryQuery {
    pub fn parse(&self) -> CategoryFilter {
        CategoryFilter {
            main_category_id: number(&self.main_category_id),
            main_category: non_empty(&self.main_category).map(String::from),
            sub_category: non_empty(&self.sub_category).map(String::from),
            search: non_empty(&self.search).map(String::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubCategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MainCategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sub_categories: Vec<SubCategoryResponse>,
}

impl MainCategoryResponse {
    pub fn new(main: Category, subs: Vec<Category>, storage: &MediaStorage) -> Self {
        Self {
            id: main.id,
            name: main.name,
            description: main.description,
            image: storage.url_opt(main.image.as_deref()),
            sub_categories: subs
                .into_iter()
                .map(|s| SubCategoryResponse {
                    id: s.id,
                    name: s.name,
                    description: s.description,
                })
                .collect(),
        }
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub main_category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub manufacturer: Option<String>,
    pub conductor_material: Option<String>,
    pub outer_insulation_material: Option<String>,
    pub conductor_insulation_material: Option<String>,
    pub outer_sheath_material: Option<String>,
    pub color: Option<String>,
    pub model_version: Option<String>,
    pub number_of_cores: Option<String>,
    pub cable_cross_section: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
    pub popular: Option<String>,
    pub new: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ProductFilter {
    pub main_category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    /// `(column, accepted values)` for the comma-separated facets.
    pub any_of: Vec<(&'static str, Vec<String>)>,
    pub number_of_cores: Option<i32>,
    pub cable_cross_section: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    pub popular: bool,
    pub newest_first: bool,
}

impl ProductQuery {
    pub fn parse(&self) -> ProductFilter {
        let facets = [
            ("manufacturer", &self.manufacturer),
            ("conductor_material", &self.conductor_material),
            ("outer_insulation_material", &self.outer_insulation_material),
            ("conductor_insulation_material", &self.conductor_insulation_material),
            ("outer_sheath_material", &self.outer_sheath_material),
            ("color", &self.color),
            ("model_version", &self.model_version),
        ];

        ProductFilter {
            main_category_id: number(&self.main_category_id),
            sub_category_id: number(&self.sub_category_id),
            any_of: facets
                .into_iter()
                .map(|(column, value)| (column, csv(value)))
                .filter(|(_, values)| !values.is_empty())
                .collect(),
            number_of_cores: number(&self.number_of_cores),
            cable_cross_section: number(&self.cable_cross_section),
            min_price: number(&self.min_price),
            max_price: number(&self.max_price),
            search: non_empty(&self.search).map(String::from),
            popular: non_empty(&self.popular).is_some_and(parse_flag),
            newest_first: non_empty(&self.new).is_some_and(parse_flag),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<String>,
}

impl SimilarQuery {
    pub fn limit(&self) -> i64 {
        number::<i64>(&self.limit).filter(|l| *l >= 1).unwrap_or(10).min(100)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub id: i64,
    pub image: String,
    pub is_main: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeterageResponse {
    pub id: i64,
    pub value: i32,
    pub is_active: bool,
}

impl From<ProductMeterage> for MeterageResponse {
    fn from(m: ProductMeterage) -> Self {
        Self {
            id: m.id,
            value: m.value,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubCategoryInfo {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub main_category: Option<CategoryRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: i64,
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
    pub supplier: Option<String>,
    pub sub_category: SubCategoryInfo,
    pub images: Vec<ImageResponse>,
    pub meterages: Vec<MeterageResponse>,
    pub is_favourite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(
        row: ProductRow,
        images: Vec<ProductImage>,
        meterages: Vec<ProductMeterage>,
        is_favourite: bool,
        storage: &MediaStorage,
    ) -> Self {
        let p = row.product;
        let main_category = match (row.main_category_id, row.main_category_name) {
            (Some(id), Some(name)) => Some(CategoryRef { id, name }),
            _ => None,
        };

        Self {
            id: p.id,
            name: p.name,
            sku: p.sku,
            description: p.description,
            price_per_meter: p.price_per_meter,
            stock: p.stock,
            manufacturer: p.manufacturer,
            country_of_origin: p.country_of_origin,
            number_of_cores: p.number_of_cores,
            conductor_material: p.conductor_material,
            cable_cross_section: p.cable_cross_section,
            outer_insulation_material: p.outer_insulation_material,
            conductor_insulation_material: p.conductor_insulation_material,
            outer_sheath_material: p.outer_sheath_material,
            model_version: p.model_version,
            color: p.color,
            is_active: p.is_active,
            supplier: p.supplier_id,
            sub_category: SubCategoryInfo {
                id: p.sub_category_id,
                name: row.sub_category_name,
                description: row.sub_category_description,
                main_category,
            },
            images: images
                .into_iter()
                .map(|i| ImageResponse {
                    id: i.id,
                    image: storage.url(&i.image),
                    is_main: i.is_main,
                    order: i.sort_order,
                })
                .collect(),
            meterages: meterages.into_iter().map(Into::into).collect(),
            is_favourite,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubCategoryRef {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct FilterDataResponse {
    pub manufacturers: Vec<String>,
    pub conductor_materials: Vec<String>,
    pub number_of_cores: Vec<i32>,
    pub main_categories: Vec<CategoryRef>,
    pub sub_categories: Vec<SubCategoryRef>,
    pub cable_cross_sections: Vec<Decimal>,
    pub outer_insulation_materials: Vec<String>,
    pub conductor_insulation_materials: Vec<String>,
    pub outer_sheath_materials: Vec<String>,
    pub colors: Vec<String>,
    pub model_versions: Vec<String>,
    pub price_range: PriceRange,
}

#[derive(Debug, Serialize)]
pub struct FavouriteResponse {
    pub message: &'static str,
    pub product_id: i64,
}
