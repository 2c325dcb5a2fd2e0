use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use crate::modules::catalog::interface::CatalogError;
use crate::services::response::{error_response, field_errors, single_field, FieldErrors};

pub type Result<T> = std::result::Result<T, OrderError>;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Delivery method not found")]
    DeliveryMethodNotFound,

    #[error("Payment method not found")]
    PaymentMethodNotFound,

    #[error("Product with ID {0} not found or inactive")]
    ProductUnavailable(i64),

    #[error("Product with ID {0} is listed more than once")]
    DuplicateProduct(i64),

    #[error("Order not found")]
    NotFound,

    #[error("Order item not found or does not belong to you")]
    LineItemNotFound,

    #[error("Unknown status: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::LineItemNotFound => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn fields(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields.clone()),
            Self::DuplicateProduct(_) => Some(single_field("product_list", self.to_string())),
            Self::InvalidStatus(_) => Some(single_field(
                "status",
                "Expected one of: Pending, Processing, Shipped",
            )),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for OrderError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl From<CatalogError> for OrderError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Database(e) => Self::Database(e),
            _ => Self::NotFound,
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, self.fields())
    }
}
