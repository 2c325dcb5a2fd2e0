use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use crate::modules::catalog::interface::CatalogError;
use crate::modules::orders::interface::OrderError;
use crate::services::response::{error_response, field_errors, single_field, FieldErrors};
use crate::services::storage::StorageError;

pub type Result<T> = std::result::Result<T, AdminError>;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("A sub category cannot be the parent of another category")]
    NestedSubCategory,

    #[error("Products must belong to a sub category")]
    NotASubCategory,

    #[error("Supplier account not found")]
    UnknownSupplier,

    #[error("A product with this SKU already exists")]
    SkuTaken,

    #[error("This meterage already exists for the product")]
    MeterageExists,

    #[error("No file was uploaded")]
    NoFile,

    #[error("Invalid upload: {source}")]
    Upload { field: String, source: StorageError },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AdminError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upload { source, .. } if !source.is_client_error() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn fields(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields.clone()),
            Self::InvalidRole(_) => Some(single_field("role", "Expected buyer or supplier")),
            Self::NestedSubCategory => Some(single_field("parent_id", self.to_string())),
            Self::NotASubCategory => Some(single_field("sub_category_id", self.to_string())),
            Self::UnknownSupplier => Some(single_field("supplier_id", self.to_string())),
            Self::SkuTaken => Some(single_field("sku", self.to_string())),
            Self::MeterageExists => Some(single_field("value", self.to_string())),
            Self::NoFile => Some(single_field("image", self.to_string())),
            Self::Upload { field, source } => Some(single_field(field, source.to_string())),
            _ => None,
        }
    }

    pub fn upload(field: &str) -> impl FnOnce(StorageError) -> Self + '_ {
        move |source| Self::Upload {
            field: field.to_string(),
            source,
        }
    }

    /// Maps a unique-key violation to `conflict`, anything else to a database error.
    pub fn unique_or(e: sqlx::Error, conflict: AdminError) -> Self {
        let duplicate = e.as_database_error().is_some_and(|db| db.is_unique_violation());
        if duplicate {
            conflict
        } else {
            Self::Database(e)
        }
    }
}

impl From<ValidationErrors> for AdminError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl From<OrderError> for AdminError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Database(e) => Self::Database(e),
            OrderError::Validation(fields) => Self::Validation(fields),
            _ => Self::NotFound("Method"),
        }
    }
}

impl From<CatalogError> for AdminError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Database(e) => Self::Database(e),
            _ => Self::NotFound("Product"),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, self.fields())
    }
}
