use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use crate::services::response::{error_response, field_errors, single_field, FieldErrors};

pub type Result<T> = std::result::Result<T, AccountError>;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("A user with this phone number already exists")]
    PhoneTaken,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0}")]
    WeakPassword(&'static str),

    #[error("Invalid email/phone or password")]
    InvalidCredentials,

    #[error("This account has been deactivated")]
    AccountDisabled,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Email is already verified")]
    AlreadyVerified,

    #[error("No user with this email address")]
    UnknownEmail,

    #[error("Old password is incorrect")]
    WrongPassword,

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Hashing(_) | Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn fields(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields.clone()),
            Self::EmailTaken => Some(single_field("email", self.to_string())),
            Self::PhoneTaken => Some(single_field("phone", self.to_string())),
            Self::PasswordMismatch => Some(single_field("password_confirm", self.to_string())),
            Self::WeakPassword(msg) => Some(single_field("password", *msg)),
            Self::WrongPassword => Some(single_field("old_password", self.to_string())),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AccountError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl From<argon2::password_hash::Error> for AccountError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::Hashing(e.to_string())
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self, self.fields())
    }
}
