use chrono::Utc;
use sqlx::{MySql, Pool, QueryBuilder};

use super::model::{Company, CompanyDocument};
use super::schema::UpdateCompanyRequest;

const DOCUMENT_COLUMNS: &str =
    "id, company_id, tin_certificate, ogrn_certificate, charter, director_appointment, created_at, updated_at";

/// Stored paths for the four document slots. `None` leaves a slot untouched on update.
pub type DocumentPaths = [Option<String>; 4];

pub struct CompanyCrud {
    pool: Pool<MySql>,
}

impl CompanyCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_account(&self, account_id: &str) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE account_id = ? ORDER BY id LIMIT 1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update(&self, id: i64, req: &UpdateCompanyRequest) -> Result<(), sqlx::Error> {
        let mut qb = QueryBuilder::<MySql>::new("UPDATE companies SET updated_at = ");
        qb.push_bind(Utc::now());

        for (column, value) in req.text_fields() {
            if let Some(value) = value {
                qb.push(format!(", {column} = ")).push_bind(value.trim().to_string());
            }
        }
        if let Some(date) = req.registration_date {
            qb.push(", registration_date = ").push_bind(date);
        }
        if let Some(matches) = req.matches_legal_address {
            qb.push(", matches_legal_address = ").push_bind(matches);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // DOCUMENTS
    // =========================================================================

    pub async fn documents(&self, company_id: i64) -> Result<Vec<CompanyDocument>, sqlx::Error> {
        sqlx::query_as::<_, CompanyDocument>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM company_documents WHERE company_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn latest_document(&self, company_id: i64) -> Result<Option<CompanyDocument>, sqlx::Error> {
        Ok(self.documents(company_id).await?.into_iter().next())
    }

    pub async fn find_document(&self, id: i64) -> Result<Option<CompanyDocument>, sqlx::Error> {
        sqlx::query_as::<_, CompanyDocument>(&format!("SELECT {DOCUMENT_COLUMNS} FROM company_documents WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create_document(&self, company_id: i64, paths: &DocumentPaths) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let [tin, ogrn, charter, appointment] = paths;

        let result = sqlx::query(
            r#"
            INSERT INTO company_documents (company_id, tin_certificate, ogrn_certificate, charter,
                                           director_appointment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(company_id)
        .bind(tin)
        .bind(ogrn)
        .bind(charter)
        .bind(appointment)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn update_document(&self, id: i64, paths: &DocumentPaths) -> Result<(), sqlx::Error> {
        let [tin, ogrn, charter, appointment] = paths;

        sqlx::query(
            r#"
            UPDATE company_documents SET
                tin_certificate = COALESCE(?, tin_certificate),
                ogrn_certificate = COALESCE(?, ogrn_certificate),
                charter = COALESCE(?, charter),
                director_appointment = COALESCE(?, director_appointment),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(tin)
        .bind(ogrn)
        .bind(charter)
        .bind(appointment)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
