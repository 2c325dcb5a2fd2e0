use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const LEGAL_FORMS: &[&str] = &["ООО", "ПАО", "АО", "ИП", "ЗАО"];
pub const ACTS_ON_BASIS: &[&str] = &["Устав", "Доверенность", "Свидетельство о регистрации ИП"];

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: i64,
    #[serde(rename = "user")]
    pub account_id: Option<String>,
    pub name_company: String,
    pub organizational_legal_form: Option<String>,
    pub abbreviated_name: Option<String>,
    pub full_name: Option<String>,
    pub inn: Option<String>,
    pub ogrn_ogrnip: Option<String>,
    pub kpp: Option<String>,
    pub okpo: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub legal_index: Option<String>,
    pub legal_region: Option<String>,
    pub legal_city: Option<String>,
    pub legal_street: Option<String>,
    pub legal_house: Option<String>,
    pub legal_building: Option<String>,
    pub legal_office: Option<String>,
    pub matches_legal_address: bool,
    pub actual_index: Option<String>,
    pub actual_region: Option<String>,
    pub actual_city: Option<String>,
    pub actual_street: Option<String>,
    pub actual_house: Option<String>,
    pub actual_building: Option<String>,
    pub actual_office: Option<String>,
    pub bank_name: Option<String>,
    pub bic: Option<String>,
    pub settlement_account: Option<String>,
    pub correspondent_account: Option<String>,
    pub contact_person_full_name: Option<String>,
    pub position: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub director_full_name: Option<String>,
    pub director_position: Option<String>,
    pub acts_on_basis: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CompanyDocument {
    pub id: i64,
    pub company_id: i64,
    pub tin_certificate: Option<String>,
    pub ogrn_certificate: Option<String>,
    pub charter: Option<String>,
    pub director_appointment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four document slots, in upload-field order.
pub const DOCUMENT_SLOTS: [&str; 4] = ["tin_certificate", "ogrn_certificate", "charter", "director_appointment"];
