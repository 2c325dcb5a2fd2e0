use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::model::{LineItemStatus, Method, Order};
use crate::modules::catalog::schema::ProductResponse;

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("min").with_message(Cow::from("Must not be negative")));
    }
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// LOOKUPS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MethodResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Method> for MethodResponse {
    fn from(m: Method) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeliveryMethodsResponse {
    pub delivery_methods: Vec<MethodResponse>,
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodsResponse {
    pub payment_methods: Vec<MethodResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMethodRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// ORDER CREATION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom(function = "validate_non_negative"))]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Product list must not be empty"), nested)]
    pub product_list: Vec<OrderItemRequest>,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, max = 10, message = "House is required"))]
    pub house: String,
    #[validate(length(max = 10))]
    pub flat: Option<String>,
    #[validate(length(max = 10))]
    pub index: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub total_price: Decimal,
    pub delivery_method: Option<i64>,
    pub payment_method: Option<i64>,
    #[validate(custom(function = "validate_non_negative"))]
    #[serde(default)]
    pub price_for_delivery: Decimal,
}

impl CreateOrderRequest {
    /// First product id that appears more than once in `product_list`.
    pub fn duplicate_product(&self) -> Option<i64> {
        let mut seen = HashSet::new();
        self.product_list
            .iter()
            .map(|item| item.product_id)
            .find(|id| !seen.insert(*id))
    }
}

// =============================================================================
// ORDER VIEWS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub id: i64,
    pub product: ProductResponse,
    pub quantity: i32,
    pub price: Decimal,
    pub status: LineItemStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub user: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub flat: Option<String>,
    pub index: Option<String>,
    pub total_price: Decimal,
    pub delivery_method: Option<MethodResponse>,
    pub payment_method: Option<MethodResponse>,
    pub price_for_delivery: Decimal,
    pub order_products: Vec<LineItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn new(
        order: Order,
        delivery_method: Option<MethodResponse>,
        payment_method: Option<MethodResponse>,
        order_products: Vec<LineItemResponse>,
    ) -> Self {
        Self {
            id: order.id,
            user: order.account_id,
            city: order.city,
            street: order.street,
            house: order.house,
            flat: order.flat,
            index: order.index,
            total_price: order.total_price,
            delivery_method,
            payment_method,
            price_for_delivery: order.price_for_delivery,
            order_products,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MyOrdersQuery {
    pub product_name: Option<String>,
    pub main_category_id: Option<String>,
    pub sub_category_id: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct MyOrdersFilter {
    pub product_name: Option<String>,
    pub main_category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
}

impl MyOrdersFilter {
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none() && self.main_category_id.is_none() && self.sub_category_id.is_none()
    }
}

impl MyOrdersQuery {
    pub fn parse(&self) -> MyOrdersFilter {
        MyOrdersFilter {
            product_name: non_empty(&self.product_name).map(String::from),
            main_category_id: non_empty(&self.main_category_id).and_then(|v| v.parse().ok()),
            sub_category_id: non_empty(&self.sub_category_id).and_then(|v| v.parse().ok()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SupplierOrdersQuery {
    pub status: Option<String>,
}

impl SupplierOrdersQuery {
    /// `Ok(None)` when no status was asked for, `Err` with the raw value when it is unknown.
    pub fn status(&self) -> Result<Option<LineItemStatus>, String> {
        match non_empty(&self.status) {
            None => Ok(None),
            Some(raw) => LineItemStatus::parse(raw).map(Some).ok_or_else(|| raw.to_string()),
        }
    }
}

// =============================================================================
// STATUS UPDATE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub message: &'static str,
    pub order_product: LineItemResponse,
}
