use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use crate::services::response::{error_response, field_errors, single_field, FieldErrors};
use crate::services::storage::StorageError;

pub type Result<T> = std::result::Result<T, CompanyError>;

#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    #[error("Company not found")]
    NotFound,

    #[error("Company documents not found")]
    DocumentsNotFound,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("No documents were uploaded")]
    NoFiles,

    #[error("Invalid upload: {source}")]
    Upload { field: String, source: StorageError },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CompanyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::DocumentsNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::NoFiles => StatusCode::BAD_REQUEST,
            Self::Upload { source, .. } if source.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Upload { .. } | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn fields(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields.clone()),
            Self::Upload { field, source } => Some(single_field(field, source.to_string())),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CompanyError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl IntoResponse for CompanyError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, self.fields())
    }
}
