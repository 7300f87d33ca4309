//! Postgres-backed user repository

use super::{NewUser, ProfileUpdate, StoreError, UniqueField, UserRecord, UserStore};
use async_trait::async_trait;
use jobboard_shared::Role;
use sqlx::PgPool;
use uuid::Uuid;

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate unique-constraint violations into [`StoreError::Duplicate`]
fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_email_key") => return StoreError::Duplicate(UniqueField::Email),
                Some("users_phone_number_key") => {
                    return StoreError::Duplicate(UniqueField::PhoneNumber)
                }
                _ => {}
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, phone_number, password_hash, role, country, city,
                   date_of_birth, education_level, token_version, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, phone_number, password_hash, role, country, city,
                   date_of_birth, education_level, token_version, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, phone_number, password_hash, role, country, city,
                   date_of_birth, education_level, token_version, created_at, updated_at
            FROM users
            WHERE phone_number = $1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(
        &self,
        role: Option<Role>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, phone_number, password_hash, role, country, city,
                   date_of_birth, education_level, token_version, created_at, updated_at
            FROM users
            WHERE ($1::TEXT IS NULL OR role = $1)
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count(&self, role: Option<Role>) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR role = $1)
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, phone_number, password_hash, role,
                               country, city, date_of_birth, education_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, email, phone_number, password_hash, role, country, city,
                      date_of_birth, education_level, token_version, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.country)
        .bind(&user.city)
        .bind(&user.date_of_birth)
        .bind(&user.education_level)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number),
                country = COALESCE($5, country),
                city = COALESCE($6, city),
                date_of_birth = COALESCE($7, date_of_birth),
                education_level = COALESCE($8, education_level),
                role = COALESCE($9, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone_number, password_hash, role, country, city,
                      date_of_birth, education_level, token_version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.phone_number)
        .bind(update.country)
        .bind(update.city)
        .bind(update.date_of_birth)
        .bind(update.education_level)
        .bind(update.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, token_version = token_version + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_sessions(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET token_version = token_version + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::health_check(&self.pool)
            .await
            .map_err(StoreError::Database)
    }
}
