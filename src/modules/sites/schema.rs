use std::borrow::Cow;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::interface::SiteError;
use super::model::{Contact, Inquiry, Partner};
use crate::services::storage::{MediaStorage, MultipartForm, UploadedFile};

fn validate_agreed(value: &bool) -> Result<(), ValidationError> {
    if *value {
        Ok(())
    } else {
        Err(ValidationError::new("privacy_policy")
            .with_message(Cow::from("You must agree to the privacy policy")))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// =============================================================================
// CONTACT
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: i64,
    pub zip_code: Option<String>,
    pub city: String,
    pub street: String,
    pub building_number: String,
    pub office_number: Option<String>,
    pub phone: String,
    pub email: String,
    pub working_hours_weekday: Option<String>,
    pub working_hours_weekend: Option<String>,
    pub map_iframe: Option<String>,
    pub full_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        let full_address = c.full_address();
        Self {
            id: c.id,
            zip_code: c.zip_code,
            city: c.city,
            street: c.street,
            building_number: c.building_number,
            office_number: c.office_number,
            phone: c.phone,
            email: c.email,
            working_hours_weekday: c.working_hours_weekday,
            working_hours_weekend: c.working_hours_weekend,
            map_iframe: c.map_iframe,
            full_address,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(max = 10))]
    pub zip_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 255))]
    pub street: String,
    #[validate(length(min = 1, max = 20))]
    pub building_number: String,
    #[validate(length(max = 50))]
    pub office_number: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 100))]
    pub working_hours_weekday: Option<String>,
    #[validate(length(max = 100))]
    pub working_hours_weekend: Option<String>,
    pub map_iframe: Option<String>,
}

// =============================================================================
// PARTNERS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PartnerResponse {
    pub id: i64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PartnerResponse {
    pub fn new(partner: Partner, storage: &MediaStorage) -> Self {
        Self {
            id: partner.id,
            image: storage.url(&partner.image),
            created_at: partner.created_at,
            updated_at: partner.updated_at,
        }
    }
}

// =============================================================================
// INQUIRIES
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InquiryForm {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Phone is required"))]
    #[serde(default)]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub comment: Option<String>,
    #[validate(custom(function = "validate_agreed"))]
    #[serde(default)]
    pub privacy_policy_agreed: bool,
}

impl InquiryForm {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: blank_to_none(self.email),
            comment: blank_to_none(self.comment),
            privacy_policy_agreed: self.privacy_policy_agreed,
        }
    }

    fn from_multipart(form: &MultipartForm) -> Self {
        Self {
            name: form.text("name").unwrap_or_default().to_string(),
            phone: form.text("phone").unwrap_or_default().to_string(),
            email: form.text("email").map(String::from),
            comment: form.text("comment").map(String::from),
            privacy_policy_agreed: form.flag("privacy_policy_agreed").unwrap_or(false),
        }
    }
}

/// An inquiry sent either as JSON or as `multipart/form-data` with an optional `file` part.
#[derive(Debug)]
pub struct InquiryPayload {
    pub form: InquiryForm,
    pub file: Option<UploadedFile>,
}

impl<S> FromRequest<S> for InquiryPayload
where
    S: Send + Sync,
{
    type Rejection = SiteError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| SiteError::Body(e.body_text()))?;
            let mut parts = MultipartForm::read(multipart)
                .await
                .map_err(SiteError::upload("non_field_errors"))?;

            Ok(Self {
                form: InquiryForm::from_multipart(&parts).normalized(),
                file: parts.files.remove("file"),
            })
        } else {
            let Json(form) = Json::<InquiryForm>::from_request(req, state)
                .await
                .map_err(|e| SiteError::Body(e.body_text()))?;
            Ok(Self {
                form: form.normalized(),
                file: None,
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InquiryCreated {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub comment: Option<String>,
    pub file: Option<String>,
    pub privacy_policy_agreed: bool,
    pub created_at: DateTime<Utc>,
}

impl InquiryResponse {
    pub fn new(inquiry: Inquiry, storage: &MediaStorage) -> Self {
        Self {
            id: inquiry.id,
            file: storage.url_opt(inquiry.file.as_deref()),
            name: inquiry.name,
            phone: inquiry.phone,
            email: inquiry.email,
            comment: inquiry.comment,
            privacy_policy_agreed: inquiry.privacy_policy_agreed,
            created_at: inquiry.created_at,
        }
    }
}
