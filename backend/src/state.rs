//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys and the dummy login hash are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::{PasswordService, TokenService};
use crate::config::AppConfig;
use crate::repositories::UserStore;
use crate::services::{CredentialStore, Mailer};
use anyhow::Result;
use std::sync::Arc;

/// Shared application state
///
/// # Performance
///
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `tokens`: Pre-computed keys wrapped in Arc, cloning is O(1)
/// - `credentials`: Store handle behind an Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session and reset token service with cached keys
    pub tokens: TokenService,
    /// Identity records and password hashing
    pub credentials: CredentialStore,
    /// Outbound mail for password recovery
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails with a [`ConfigError`](crate::config::ConfigError) when a
    /// token secret or lifetime is missing or the bcrypt cost is out of
    /// range. Callers treat this as fatal at startup.
    pub fn new(store: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, config: AppConfig) -> Result<Self> {
        let tokens = TokenService::from_config(&config.auth)?;
        let passwords = PasswordService::new(config.auth.checked_bcrypt_cost()?);
        let credentials = CredentialStore::new(store, passwords)?;

        Ok(Self {
            config: Arc::new(config),
            tokens,
            credentials,
            mailer,
        })
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token service
    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get a reference to the credential store
    #[inline]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Get a shared handle to the mailer
    #[inline]
    pub fn mailer(&self) -> Arc<dyn Mailer> {
        Arc::clone(&self.mailer)
    }
}
