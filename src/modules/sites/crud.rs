use chrono::Utc;
use sqlx::{MySql, Pool};

use super::model::{Contact, Inquiry, Partner};
use super::schema::{ContactRequest, InquiryForm};
use crate::services::pagination::Page;

pub struct SiteCrud {
    pool: Pool<MySql>,
}

impl SiteCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CONTACT
    // =========================================================================

    pub async fn latest_contact(&self) -> Result<Option<Contact>, sqlx::Error> {
        sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY created_at DESC, id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    /// Rewrites the newest contact record, or creates the first one.
    pub async fn upsert_contact(&self, req: &ContactRequest) -> Result<i64, sqlx::Error> {
        let now = Utc::now();

        if let Some(existing) = self.latest_contact().await? {
            sqlx::query(
                r#"
                UPDATE contacts SET zip_code = ?, city = ?, street = ?, building_number = ?, office_number = ?,
                    phone = ?, email = ?, working_hours_weekday = ?, working_hours_weekend = ?, map_iframe = ?,
                    updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(req.zip_code.as_deref())
            .bind(&req.city)
            .bind(&req.street)
            .bind(&req.building_number)
            .bind(req.office_number.as_deref())
            .bind(&req.phone)
            .bind(&req.email)
            .bind(req.working_hours_weekday.as_deref())
            .bind(req.working_hours_weekend.as_deref())
            .bind(req.map_iframe.as_deref())
            .bind(now)
            .bind(existing.id)
            .execute(&self.pool)
            .await?;
            return Ok(existing.id);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO contacts (zip_code, city, street, building_number, office_number, phone, email,
                                  working_hours_weekday, working_hours_weekend, map_iframe, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.zip_code.as_deref())
        .bind(&req.city)
        .bind(&req.street)
        .bind(&req.building_number)
        .bind(req.office_number.as_deref())
        .bind(&req.phone)
        .bind(&req.email)
        .bind(req.working_hours_weekday.as_deref())
        .bind(req.working_hours_weekend.as_deref())
        .bind(req.map_iframe.as_deref())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    // =========================================================================
    // PARTNERS
    // =========================================================================

    pub async fn partners(&self) -> Result<Vec<Partner>, sqlx::Error> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_partner(&self, id: i64) -> Result<Option<Partner>, sqlx::Error> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create_partner(&self, image: &str) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO partners (image, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(image)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn delete_partner(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM partners WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // INQUIRIES
    // =========================================================================

    pub async fn create_inquiry(&self, form: &InquiryForm, file: Option<&str>) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO inquiries (name, phone, email, comment, file, privacy_policy_agreed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&form.name)
        .bind(&form.phone)
        .bind(form.email.as_deref())
        .bind(form.comment.as_deref())
        .bind(file)
        .bind(form.privacy_policy_agreed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn list_inquiries(&self, page: Page) -> Result<(Vec<Inquiry>, i64), sqlx::Error> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inquiries")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query_as::<_, Inquiry>(
            "SELECT * FROM inquiries ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
