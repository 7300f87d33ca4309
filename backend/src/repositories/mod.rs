//! Identity persistence
//!
//! [`UserStore`] is the seam between the credential logic and whatever
//! holds the account records. Postgres is the production backend; the
//! in-memory store backs tests and single-process demos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobboard_shared::{Role, UserView};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod user;

pub use memory::MemoryUserStore;
pub use user::PgUserStore;

/// Account fields that must be unique across all identities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    PhoneNumber,
}

impl UniqueField {
    pub fn message(&self) -> &'static str {
        match self {
            UniqueField::Email => "Email already exists",
            UniqueField::PhoneNumber => "Phone number already exists",
        }
    }
}

/// Storage failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// Rejected by the storage-level uniqueness backstop
    #[error("duplicate value for {0:?}")]
    Duplicate(UniqueField),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User record from storage
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub country: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<String>,
    pub education_level: Option<String>,
    /// Incremented whenever existing sessions must stop working
    pub token_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view of the record, without the password hash
    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            role: self.role,
            country: self.country.clone(),
            city: self.city.clone(),
            date_of_birth: self.date_of_birth.clone(),
            education_level: self.education_level.clone(),
            created_at: self.created_at,
        }
    }
}

/// Input for creating a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
    pub country: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<String>,
    pub education_level: Option<String>,
}

/// Input for updating profile fields; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<String>,
    pub education_level: Option<String>,
    pub role: Option<Role>,
}

/// Backing store for identity records
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Page through users ordered by creation time
    async fn list(
        &self,
        role: Option<Role>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UserRecord>, StoreError>;

    async fn count(&self, role: Option<Role>) -> Result<u64, StoreError>;

    /// Insert a user, failing with [`StoreError::Duplicate`] on a taken
    /// email or phone number
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Apply a partial update. Returns `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Overwrite the password hash and invalidate existing sessions
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    /// Invalidate existing sessions without touching credentials
    async fn revoke_sessions(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> Result<(), StoreError>;
}
