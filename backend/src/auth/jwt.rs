//! Session and password-reset token issuance and verification
//!
//! Both token kinds are HS256 JWTs, but each is signed with its own secret
//! and carries a `purpose` claim that the matching verifier checks, so a
//! reset token can never stand in for a session and vice versa.

use crate::config::{AuthConfig, ConfigError, TokenSettings};
use crate::repositories::UserRecord;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jobboard_shared::{AuthError, Role};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

const SESSION_PURPOSE: &str = "session";
const RESET_PURPOSE: &str = "reset";

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Token generation of the account at issuance
    pub ver: i32,
    pub purpose: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a password-reset token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetClaims {
    pub user_email: String,
    pub purpose: String,
    pub iat: i64,
    pub exp: i64,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token service for session and reset tokens
///
/// Built once at startup from validated settings and shared through
/// `AppState`. Keys are wrapped in Arc for cheap cloning.
#[derive(Clone)]
pub struct TokenService {
    session_keys: JwtKeys,
    reset_keys: JwtKeys,
    session_lifetime: Duration,
    reset_lifetime: Duration,
    validation: Arc<Validation>,
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    }
}

impl TokenService {
    /// Create the service from already validated settings
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            session_keys: JwtKeys::new(settings.session_secret.expose_secret()),
            reset_keys: JwtKeys::new(settings.reset_secret.expose_secret()),
            session_lifetime: settings.session_lifetime,
            reset_lifetime: settings.reset_lifetime,
            validation: Arc::new(validation),
        }
    }

    /// Create the service from raw configuration
    ///
    /// Fails when a secret or lifetime is missing; callers treat this as
    /// fatal at startup.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(&config.token_settings()?))
    }

    /// Issue a session token for a user
    #[inline]
    pub fn issue_session(&self, user: &UserRecord) -> Result<String> {
        self.issue_session_at(user, Utc::now())
    }

    pub(crate) fn issue_session_at(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<String> {
        let claims = SessionClaims {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            phone_number: user.phone_number.clone(),
            country: user.country.clone(),
            city: user.city.clone(),
            ver: user.token_version,
            purpose: SESSION_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.session_lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.session_keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate session token: {}", e))
    }

    /// Verify a session token: signature first, then expiry, then purpose
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims: SessionClaims = self.decode(token, &self.session_keys)?;
        if claims.purpose != SESSION_PURPOSE {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Issue a password-reset token scoped to one email address
    #[inline]
    pub fn issue_reset(&self, email: &str) -> Result<String> {
        self.issue_reset_at(email, Utc::now())
    }

    pub(crate) fn issue_reset_at(&self, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = ResetClaims {
            user_email: email.to_string(),
            purpose: RESET_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.reset_lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.reset_keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate reset token: {}", e))
    }

    /// Verify a reset token and return its claims
    ///
    /// Reset tokens are not single-use; one stays valid until it expires.
    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, AuthError> {
        let claims: ResetClaims = self.decode(token, &self.reset_keys)?;
        if claims.purpose != RESET_PURPOSE {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    fn decode<T: DeserializeOwned>(&self, token: &str, keys: &JwtKeys) -> Result<T, AuthError> {
        decode::<T>(token, keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Session lifetime in seconds, reported to clients as `expiresIn`
    #[inline]
    pub fn session_lifetime_secs(&self) -> i64 {
        self.session_lifetime.num_seconds()
    }
}
