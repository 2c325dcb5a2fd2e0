use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Contact {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// `zip, c. City, st. Street, b. 12, of. 5` with the optional parts left out when blank.
    pub fn full_address(&self) -> String {
        let mut parts = Vec::with_capacity(5);
        if let Some(zip) = self.zip_code.as_deref().filter(|z| !z.trim().is_empty()) {
            parts.push(zip.to_string());
        }
        parts.push(format!("c. {}", self.city));
        parts.push(format!("st. {}", self.street));
        parts.push(format!("b. {}", self.building_number));
        if let Some(office) = self.office_number.as_deref().filter(|o| !o.trim().is_empty()) {
            parts.push(format!("of. {office}"));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Partner {
    pub id: i64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A "leave a request" submission from the public site.
#[derive(Debug, Clone, FromRow)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub comment: Option<String>,
    pub file: Option<String>,
    pub privacy_policy_agreed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
