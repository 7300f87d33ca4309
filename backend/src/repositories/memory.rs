//! In-memory user repository
//!
//! Uniqueness checks and the insert happen under one write lock, so this
//! store gives the same duplicate guarantee as the Postgres constraints.

use super::{NewUser, ProfileUpdate, StoreError, UniqueField, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use jobboard_shared::Role;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict(
    users: &HashMap<Uuid, UserRecord>,
    except: Option<Uuid>,
    email: Option<&str>,
    phone_number: Option<&str>,
) -> Option<UniqueField> {
    let others = || users.values().filter(move |u| Some(u.id) != except);

    if let Some(email) = email {
        if others().any(|u| u.email == email) {
            return Some(UniqueField::Email);
        }
    }
    if let Some(phone) = phone_number {
        if others().any(|u| u.phone_number == phone) {
            return Some(UniqueField::PhoneNumber);
        }
    }
    None
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn list(
        &self,
        role: Option<Role>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.read().await;
        let mut matching: Vec<&UserRecord> = users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .collect();
        matching.sort_by_key(|u| (u.created_at, u.id));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, role: Option<Role>) -> Result<u64, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .count() as u64)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;

        if let Some(field) = conflict(
            &users,
            None,
            Some(&user.email),
            Some(&user.phone_number),
        ) {
            return Err(StoreError::Duplicate(field));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            role: user.role,
            country: user.country,
            city: user.city,
            date_of_birth: user.date_of_birth,
            education_level: user.education_level,
            token_version: 0,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.write().await;

        if !users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(field) = conflict(
            &users,
            Some(id),
            update.email.as_deref(),
            update.phone_number.as_deref(),
        ) {
            return Err(StoreError::Duplicate(field));
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(phone) = update.phone_number {
            user.phone_number = phone;
        }
        if let Some(country) = update.country {
            user.country = Some(country);
        }
        if let Some(city) = update.city {
            user.city = Some(city);
        }
        if let Some(dob) = update.date_of_birth {
            user.date_of_birth = Some(dob);
        }
        if let Some(level) = update.education_level {
            user.education_level = Some(level);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.token_version += 1;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn revoke_sessions(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.token_version += 1;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
