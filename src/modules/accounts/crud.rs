use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::{MySql, Pool, QueryBuilder, Transaction};
use uuid::Uuid;

use super::model::{Account, OneTimeToken, Role, TokenPurpose};
use super::schema::UpdateProfileRequest;
use crate::services::hashing;
use crate::services::pagination::Page;

pub(crate) const ACCOUNT_COLUMNS: &str = "id, email, phone, first_name, last_name, city, street, house, flat, \
     `index`, role, is_staff, is_active, is_email_verified, password_hash, created_at, updated_at";

pub struct AccountCrud {
    pool: Pool<MySql>,
}

/// Flags a staff member may toggle on any account.
#[derive(Debug, Default, Deserialize)]
pub struct AccountFlags {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_email_verified: Option<bool>,
}

impl AccountCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Inserts the account and, for suppliers, the company it owns. Returns the company id.
    pub async fn create(&self, account: &Account, company_name: Option<&str>) -> Result<Option<i64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, phone, first_name, last_name, role, is_staff, is_active,
                                  is_email_verified, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.role.as_str())
        .bind(account.is_staff)
        .bind(account.is_active)
        .bind(account.is_email_verified)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await?;

        let company_id = match company_name {
            Some(name) => {
                let result = sqlx::query(
                    "INSERT INTO companies (account_id, name_company, created_at, updated_at) VALUES (?, ?, ?, ?)",
                )
                .bind(&account.id)
                .bind(name)
                .bind(account.created_at)
                .bind(account.updated_at)
                .execute(&mut *tx)
                .await?;
                Some(result.last_insert_id() as i64)
            }
            None => None,
        };

        tx.commit().await?;
        Ok(company_id)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE phone = ?"))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    pub async fn phone_exists(&self, phone: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE phone = ?")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    pub async fn update_profile(&self, id: &str, req: &UpdateProfileRequest) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                city = COALESCE(?, city),
                street = COALESCE(?, street),
                house = COALESCE(?, house),
                flat = COALESCE(?, flat),
                `index` = COALESCE(?, `index`),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.city)
        .bind(&req.street)
        .bind(&req.house)
        .bind(&req.flat)
        .bind(&req.index)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // ONE-TIME TOKENS
    // =========================================================================

    /// Supersedes every outstanding token of `purpose` for the account and stores a new one.
    /// Returns the raw token; only its digest is persisted.
    pub async fn issue_token(&self, account_id: &str, purpose: TokenPurpose, ttl: Duration) -> Result<String, sqlx::Error> {
        let raw = hashing::generate_token();
        let now = Utc::now();
        let table = purpose.table();

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("UPDATE {table} SET is_used = TRUE WHERE account_id = ? AND is_used = FALSE"))
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            "INSERT INTO {table} (id, account_id, token_hash, expires_at, is_used, created_at) VALUES (?, ?, ?, ?, FALSE, ?)"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(account_id)
        .bind(hashing::hash_token(&raw))
        .bind(now + ttl)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(raw)
    }

    pub async fn find_token(&self, purpose: TokenPurpose, raw: &str) -> Result<Option<OneTimeToken>, sqlx::Error> {
        sqlx::query_as::<_, OneTimeToken>(&format!(
            "SELECT id, account_id, token_hash, expires_at, is_used, created_at FROM {} WHERE token_hash = ?",
            purpose.table()
        ))
        .bind(hashing::hash_token(raw))
        .fetch_optional(&self.pool)
        .await
    }

    /// Claims a token for one redemption. Only one caller can flip `is_used` on a live token.
    async fn claim_token(
        tx: &mut Transaction<'_, MySql>,
        purpose: TokenPurpose,
        token: &OneTimeToken,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_used = TRUE WHERE id = ? AND is_used = FALSE AND expires_at > ?",
            purpose.table()
        ))
        .bind(&token.id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Marks the account verified and the token used, atomically.
    /// Returns `false` when the token was redeemed or expired in the meantime.
    pub async fn confirm_email(&self, token: &OneTimeToken) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !Self::claim_token(&mut tx, TokenPurpose::EmailVerification, token).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE accounts SET is_email_verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(&token.account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Sets the new password and burns every outstanding reset token of the account.
    /// Returns `false` when the token was redeemed or expired in the meantime.
    pub async fn complete_reset(&self, token: &OneTimeToken, password_hash: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !Self::claim_token(&mut tx, TokenPurpose::PasswordReset, token).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(&token.account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_reset_tokens SET is_used = TRUE WHERE account_id = ? AND is_used = FALSE")
            .bind(&token.account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    // =========================================================================
    // STAFF
    // =========================================================================

    pub async fn list(&self, role: Option<Role>, page: Page) -> Result<(Vec<Account>, i64), sqlx::Error> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM accounts");
        let mut rows = QueryBuilder::<MySql>::new(format!("SELECT {ACCOUNT_COLUMNS} FROM accounts"));
        if let Some(role) = role {
            count.push(" WHERE role = ").push_bind(role.as_str());
            rows.push(" WHERE role = ").push_bind(role.as_str());
        }
        rows.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;
        let accounts = rows.build_query_as::<Account>().fetch_all(&self.pool).await?;
        Ok((accounts, total))
    }

    pub async fn set_flags(&self, id: &str, flags: &AccountFlags) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                is_active = COALESCE(?, is_active),
                is_staff = COALESCE(?, is_staff),
                is_email_verified = COALESCE(?, is_email_verified),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(flags.is_active)
        .bind(flags.is_staff)
        .bind(flags.is_email_verified)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
