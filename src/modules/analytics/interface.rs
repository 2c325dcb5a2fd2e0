use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::response::{error_response, single_field, FieldErrors};

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Month must be between 1 and 12")]
    InvalidMonth,

    #[error("Year must be between 2000 and 2100")]
    InvalidYear,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AnalyticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMonth | Self::InvalidYear => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn fields(&self) -> Option<FieldErrors> {
        match self {
            Self::InvalidMonth => Some(single_field("month", self.to_string())),
            Self::InvalidYear => Some(single_field("year", self.to_string())),
            Self::Database(_) => None,
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, self.fields())
    }
}
