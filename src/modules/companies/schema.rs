use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::model::{Company, CompanyDocument, ACTS_ON_BASIS, LEGAL_FORMS};
use crate::services::storage::MediaStorage;

fn digits(value: &str, lengths: &[usize], code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.chars().all(|c| c.is_ascii_digit()) && lengths.contains(&value.len()) {
        Ok(())
    } else {
        Err(ValidationError::new(code).with_message(Cow::from(message)))
    }
}

pub fn validate_inn(value: &str) -> Result<(), ValidationError> {
    digits(value, &[10, 12], "inn", "INN must contain 10 or 12 digits")
}

pub fn validate_ogrn(value: &str) -> Result<(), ValidationError> {
    digits(value, &[13, 15], "ogrn", "OGRN must contain 13 digits, OGRNIP 15 digits")
}

pub fn validate_kpp(value: &str) -> Result<(), ValidationError> {
    digits(value, &[9], "kpp", "KPP must contain 9 digits")
}

pub fn validate_okpo(value: &str) -> Result<(), ValidationError> {
    digits(value, &[8, 10], "okpo", "OKPO must contain 8 or 10 digits")
}

pub fn validate_bic(value: &str) -> Result<(), ValidationError> {
    digits(value, &[9], "bic", "BIC must contain 9 digits")
}

pub fn validate_bank_account(value: &str) -> Result<(), ValidationError> {
    digits(value, &[20], "account", "Account number must contain 20 digits")
}

pub fn validate_legal_form(value: &str) -> Result<(), ValidationError> {
    if LEGAL_FORMS.contains(&value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("choice").with_message(Cow::from("Unknown organizational legal form")))
    }
}

pub fn validate_acts_on_basis(value: &str) -> Result<(), ValidationError> {
    if ACTS_ON_BASIS.contains(&value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("choice").with_message(Cow::from("Unknown basis of authority")))
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name_company: Option<String>,
    #[validate(custom(function = "validate_legal_form"))]
    pub organizational_legal_form: Option<String>,
    #[validate(length(max = 255))]
    pub abbreviated_name: Option<String>,
    #[validate(length(max = 500))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_inn"))]
    pub inn: Option<String>,
    #[validate(custom(function = "validate_ogrn"))]
    pub ogrn_ogrnip: Option<String>,
    #[validate(custom(function = "validate_kpp"))]
    pub kpp: Option<String>,
    #[validate(custom(function = "validate_okpo"))]
    pub okpo: Option<String>,
    pub registration_date: Option<NaiveDate>,
    #[validate(length(max = 6))]
    pub legal_index: Option<String>,
    pub legal_region: Option<String>,
    pub legal_city: Option<String>,
    pub legal_street: Option<String>,
    pub legal_house: Option<String>,
    pub legal_building: Option<String>,
    pub legal_office: Option<String>,
    pub matches_legal_address: Option<bool>,
    #[validate(length(max = 6))]
    pub actual_index: Option<String>,
    pub actual_region: Option<String>,
    pub actual_city: Option<String>,
    pub actual_street: Option<String>,
    pub actual_house: Option<String>,
    pub actual_building: Option<String>,
    pub actual_office: Option<String>,
    pub bank_name: Option<String>,
    #[validate(custom(function = "validate_bic"))]
    pub bic: Option<String>,
    #[validate(custom(function = "validate_bank_account"))]
    pub settlement_account: Option<String>,
    #[validate(custom(function = "validate_bank_account"))]
    pub correspondent_account: Option<String>,
    pub contact_person_full_name: Option<String>,
    pub position: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub director_full_name: Option<String>,
    pub director_position: Option<String>,
    #[validate(custom(function = "validate_acts_on_basis"))]
    pub acts_on_basis: Option<String>,
}

impl UpdateCompanyRequest {
    /// Text columns paired with their new values.
    pub fn text_fields(&self) -> [(&'static str, Option<&String>); 33] {
        [
            ("name_company", self.name_company.as_ref()),
            ("organizational_legal_form", self.organizational_legal_form.as_ref()),
            ("abbreviated_name", self.abbreviated_name.as_ref()),
            ("full_name", self.full_name.as_ref()),
            ("inn", self.inn.as_ref()),
            ("ogrn_ogrnip", self.ogrn_ogrnip.as_ref()),
            ("kpp", self.kpp.as_ref()),
            ("okpo", self.okpo.as_ref()),
            ("legal_index", self.legal_index.as_ref()),
            ("legal_region", self.legal_region.as_ref()),
            ("legal_city", self.legal_city.as_ref()),
            ("legal_street", self.legal_street.as_ref()),
            ("legal_house", self.legal_house.as_ref()),
            ("legal_building", self.legal_building.as_ref()),
            ("legal_office", self.legal_office.as_ref()),
            ("actual_index", self.actual_index.as_ref()),
            ("actual_region", self.actual_region.as_ref()),
            ("actual_city", self.actual_city.as_ref()),
            ("actual_street", self.actual_street.as_ref()),
            ("actual_house", self.actual_house.as_ref()),
            ("actual_building", self.actual_building.as_ref()),
            ("actual_office", self.actual_office.as_ref()),
            ("bank_name", self.bank_name.as_ref()),
            ("bic", self.bic.as_ref()),
            ("settlement_account", self.settlement_account.as_ref()),
            ("correspondent_account", self.correspondent_account.as_ref()),
            ("contact_person_full_name", self.contact_person_full_name.as_ref()),
            ("position", self.position.as_ref()),
            ("phone_number", self.phone_number.as_ref()),
            ("email", self.email.as_ref()),
            ("director_full_name", self.director_full_name.as_ref()),
            ("director_position", self.director_position.as_ref()),
            ("acts_on_basis", self.acts_on_basis.as_ref()),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i64,
    pub company: i64,
    pub tin_certificate: Option<String>,
    pub ogrn_certificate: Option<String>,
    pub charter: Option<String>,
    pub director_appointment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn new(doc: CompanyDocument, storage: &MediaStorage) -> Self {
        Self {
            id: doc.id,
            company: doc.company_id,
            tin_certificate: storage.url_opt(doc.tin_certificate.as_deref()),
            ogrn_certificate: storage.url_opt(doc.ogrn_certificate.as_deref()),
            charter: storage.url_opt(doc.charter.as_deref()),
            director_appointment: storage.url_opt(doc.director_appointment.as_deref()),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    #[serde(flatten)]
    pub company: Company,
    pub documents: Vec<DocumentResponse>,
}
