use std::borrow::Cow;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::model::{Account, Role};

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();
}

/// Strips spaces, dashes and brackets so `+7 (999) 123-45-67` is stored as `+79991234567`.
pub fn normalize_phone(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(&normalize_phone(value)) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message(Cow::from("Enter a valid phone number")))
    }
}

fn validate_company_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::from("Company name is required")));
    }
    Ok(())
}

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    pub last_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterSupplierRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    pub last_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
    #[validate(length(max = 255), custom(function = "validate_company_name"))]
    pub name_company: String,
}

/// Fields shared by both registration flows.
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

impl RegisterRequest {
    pub fn new_account(&self) -> NewAccount<'_> {
        NewAccount {
            email: &self.email,
            first_name: &self.first_name,
            last_name: &self.last_name,
            phone: &self.phone,
            password: &self.password,
            password_confirm: &self.password_confirm,
        }
    }
}

impl RegisterSupplierRequest {
    pub fn new_account(&self) -> NewAccount<'_> {
        NewAccount {
            email: &self.email,
            first_name: &self.first_name,
            last_name: &self.last_name,
            phone: &self.phone,
            password: &self.password,
            password_confirm: &self.password_confirm,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct RegisterSupplierResponse {
    pub message: &'static str,
    pub user_id: String,
    pub company_id: i64,
}

// =============================================================================
// LOGIN / TOKENS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email_or_phone: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

// =============================================================================
// PROFILE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub flat: Option<String>,
    pub index: Option<String>,
    pub role: Role,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for UserResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            phone: a.phone,
            first_name: a.first_name,
            last_name: a.last_name,
            city: a.city,
            street: a.street,
            house: a.house,
            flat: a.flat,
            index: a.index,
            role: a.role,
            is_email_verified: a.is_email_verified,
            created_at: a.created_at,
        }
    }
}

/// Partial profile update. Email and phone are not editable here.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    pub street: Option<String>,
    #[validate(length(max = 10))]
    pub house: Option<String>,
    #[validate(length(max = 10))]
    pub flat: Option<String>,
    #[validate(length(max = 10))]
    pub index: Option<String>,
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

// =============================================================================
// PASSWORDS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}
