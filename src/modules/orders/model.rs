use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fulfilment state of one order line. Any value may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemStatus {
    Pending,
    Processing,
    Shipped,
}

impl LineItemStatus {
    pub const ALL: [LineItemStatus; 3] = [Self::Pending, Self::Processing, Self::Shipped];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value.trim())
    }
}

impl TryFrom<String> for LineItemStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown line item status: {value}"))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Method {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub account_id: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub flat: Option<String>,
    pub index: Option<String>,
    pub total_price: Decimal,
    pub delivery_method_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub price_for_delivery: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
    #[sqlx(try_from = "String")]
    pub status: LineItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
