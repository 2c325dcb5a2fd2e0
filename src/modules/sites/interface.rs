use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use crate::services::response::{error_response, field_errors, single_field, FieldErrors};
use crate::services::storage::StorageError;

pub type Result<T> = std::result::Result<T, SiteError>;

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Contact information not found")]
    ContactNotFound,

    #[error("Partner not found")]
    PartnerNotFound,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Malformed request body: {0}")]
    Body(String),

    #[error("Invalid upload: {source}")]
    Upload { field: String, source: StorageError },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SiteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ContactNotFound | Self::PartnerNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
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

    pub fn upload(field: &str) -> impl FnOnce(StorageError) -> Self + '_ {
        move |source| Self::Upload {
            field: field.to_string(),
            source,
        }
    }
}

impl From<ValidationErrors> for SiteError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, self.fields())
    }
}
