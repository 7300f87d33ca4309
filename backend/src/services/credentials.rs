//! Credential store: identity records plus their hashed passwords
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - The backing store is shared behind an Arc, cloning is O(1)

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{NewUser, ProfileUpdate, StoreError, UserRecord, UserStore};
use jobboard_shared::types::{RegisterRequest, UpdateUserRequest, UserListQuery, UserListResponse};
use jobboard_shared::validation;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Owner of all identity records
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
    /// Verified against when the email is unknown so both login failures
    /// cost one bcrypt verification
    dummy_hash: Arc<str>,
}

/// Duplicate rejections become validation errors; anything else stays a
/// storage failure
fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate(field) => ApiError::Validation(field.message().to_string()),
        other => ApiError::Store(other),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CredentialStore {
    pub fn new(store: Arc<dyn UserStore>, passwords: PasswordService) -> anyhow::Result<Self> {
        let dummy_hash = passwords.hash("timing-equalizer")?;
        Ok(Self {
            store,
            passwords,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, ApiError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        Ok(self.store.find_by_email(email).await?)
    }

    pub async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, ApiError> {
        Ok(self.store.find_by_phone(phone_number).await?)
    }

    /// Create an identity, hashing the plaintext password
    ///
    /// The role defaults to `user` when the request does not name one.
    pub async fn create(&self, fields: RegisterRequest) -> Result<UserRecord, ApiError> {
        validation::validate_name(&fields.name).map_err(ApiError::Validation)?;
        validation::validate_email(&fields.email).map_err(ApiError::Validation)?;
        validation::validate_phone_number(&fields.phone_number).map_err(ApiError::Validation)?;
        validation::validate_password(&fields.password).map_err(ApiError::Validation)?;

        if self.store.find_by_email(&fields.email).await?.is_some() {
            return Err(ApiError::Validation("Email already exists".to_string()));
        }
        if self.store.find_by_phone(&fields.phone_number).await?.is_some() {
            return Err(ApiError::Validation(
                "Phone number already exists".to_string(),
            ));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = self
            .passwords
            .hash_async(fields.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = self
            .store
            .insert(NewUser {
                name: fields.name.trim().to_string(),
                email: fields.email,
                phone_number: fields.phone_number,
                password_hash,
                role: fields.role.unwrap_or_default(),
                country: non_empty(fields.country),
                city: non_empty(fields.city),
                date_of_birth: non_empty(fields.date_of_birth),
                education_level: non_empty(fields.education_level),
            })
            .await
            .map_err(store_error)?;

        info!(user_id = %user.id, role = %user.role, "Identity created");
        Ok(user)
    }

    /// Check a plaintext password against the stored hash
    pub async fn verify_password(
        &self,
        user: &UserRecord,
        plaintext: &str,
    ) -> Result<bool, ApiError> {
        PasswordService::verify_async(plaintext.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)
    }

    /// Resolve an email/password pair to an identity
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, ApiError> {
        let Some(user) = self.store.find_by_email(email).await? else {
            PasswordService::verify_async(password.to_string(), self.dummy_hash.to_string())
                .await
                .map_err(ApiError::Internal)?;
            debug!("Login rejected: unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        if !self.verify_password(&user, password).await? {
            debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Rehash and overwrite the password; existing sessions stop working
    pub async fn update_password(
        &self,
        user: &UserRecord,
        new_plaintext: &str,
    ) -> Result<(), ApiError> {
        validation::validate_password(new_plaintext).map_err(ApiError::Validation)?;

        let password_hash = self
            .passwords
            .hash_async(new_plaintext.to_string())
            .await
            .map_err(ApiError::Internal)?;

        if !self.store.update_password(user.id, &password_hash).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user.id, "Password updated");
        Ok(())
    }

    /// Change a password after proving knowledge of the current one
    pub async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(ApiError::BadRequest(
                "Please provide both values".to_string(),
            ));
        }

        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if !self.verify_password(&user, old_password).await? {
            return Err(ApiError::InvalidCredentials);
        }

        self.update_password(&user, new_password).await
    }

    /// Overwrite each provided, non-empty field
    ///
    /// A new email or phone number must not belong to any other identity.
    pub async fn update_profile_fields(
        &self,
        id: Uuid,
        fields: UpdateUserRequest,
    ) -> Result<UserRecord, ApiError> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let update = ProfileUpdate {
            name: non_empty(fields.name).map(|n| n.trim().to_string()),
            email: non_empty(fields.email),
            phone_number: non_empty(fields.phone_number),
            country: non_empty(fields.country),
            city: non_empty(fields.city),
            date_of_birth: non_empty(fields.date_of_birth),
            education_level: non_empty(fields.education_level),
            role: fields.role,
        };

        if let Some(email) = &update.email {
            validation::validate_email(email).map_err(ApiError::Validation)?;
            if let Some(other) = self.store.find_by_email(email).await? {
                if other.id != id {
                    return Err(ApiError::Validation("Email already exists".to_string()));
                }
            }
        }
        if let Some(phone) = &update.phone_number {
            validation::validate_phone_number(phone).map_err(ApiError::Validation)?;
            if let Some(other) = self.store.find_by_phone(phone).await? {
                if other.id != id {
                    return Err(ApiError::Validation(
                        "Phone number already exists".to_string(),
                    ));
                }
            }
        }

        self.store
            .update_profile(id, update)
            .await
            .map_err(store_error)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Invalidate every session issued so far for this identity
    pub async fn revoke_sessions(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.revoke_sessions(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        info!(user_id = %id, "Identity deleted");
        Ok(())
    }

    /// One page of identities with paging totals
    pub async fn list(&self, query: &UserListQuery) -> Result<UserListResponse, ApiError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = u64::from(page - 1) * u64::from(limit);

        let users = self.store.list(query.role, offset, u64::from(limit)).await?;
        let total = self.store.count(query.role).await?;
        let total_pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);

        Ok(UserListResponse {
            users: users.iter().map(UserRecord::to_view).collect(),
            current_page: page,
            total_pages,
            total_users: total,
        })
    }
}
