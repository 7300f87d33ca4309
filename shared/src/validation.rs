//! Input validation functions
//!
//! This module provides validation utilities for account input.
//! Uses both custom validators and the `validator` crate.

use std::sync::OnceLock;
use validator::ValidateEmail;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 4;
/// Maximum password length in bytes, the most bcrypt will hash
pub const MAX_PASSWORD_LEN: usize = 72;

fn phone_regex() -> &'static regex_lite::Regex {
    static PHONE: OnceLock<regex_lite::Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        regex_lite::Regex::new(r"^\+?[0-9][0-9 \-]{5,19}$").expect("phone pattern compiles")
    })
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password length
///
/// The minimum counts characters; the maximum counts UTF-8 bytes.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_LEN
        ));
    }
    Ok(())
}

/// Validate phone number
pub fn validate_phone_number(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number cannot be empty".to_string());
    }
    if !phone_regex().is_match(phone) {
        return Err("Invalid phone number format".to_string());
    }
    Ok(())
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.len() > 100 {
        return Err("Name too long".to_string());
    }
    Ok(())
}
