use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::response::error_response;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Product is not in favourites")]
    NotFavourite,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProductNotFound | Self::NotFavourite => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, None)
    }
}
