//! User: a back-office account.
//!
//! Accounts start unverified. A one-time verification code is mailed at
//! registration; a separate recovery code is mailed when a password reset
//! is requested. Both codes are cleared once used, and a recovery code is
//! also dropped after [`MAX_RECOVERY_ATTEMPTS`] wrong guesses.

use serde::{Deserialize, Serialize};

use crate::customer::is_plausible_email;
use crate::error::{AuthError, MiniShopError, ValidationError};
use crate::id::UserId;
use crate::time::{Timestamp, now};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Wrong recovery codes tolerated before the pending code is discarded.
pub const MAX_RECOVERY_ATTEMPTS: u32 = 5;

/// A registered account. Secrets are never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing)]
    pub recovery_code: Option<String>,
    #[serde(skip_serializing)]
    pub recovery_attempts: u32,
    pub since: Timestamp,
}

impl User {
    /// Create an unverified account from a validated registration.
    #[must_use]
    pub fn register(
        registration: &Registration,
        password_hash: String,
        verification_code: String,
    ) -> Self {
        Self {
            id: UserId::new(),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            email: normalize_email(&registration.email),
            username: registration.username.trim().to_string(),
            password_hash,
            verified: false,
            verification_code: Some(verification_code),
            recovery_code: None,
            recovery_attempts: 0,
            since: now(),
        }
    }

    /// Mark the account verified if `code` matches the pending verification code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCode`] when no code is pending or it differs.
    pub fn verify(&mut self, code: &str) -> Result<(), AuthError> {
        match &self.verification_code {
            Some(expected) if expected == code.trim() => {
                self.verified = true;
                self.verification_code = None;
                Ok(())
            }
            _ => Err(AuthError::InvalidCode),
        }
    }

    /// Store a fresh recovery code, replacing any previous one.
    pub fn start_recovery(&mut self, code: String) {
        self.recovery_code = Some(code);
        self.recovery_attempts = 0;
    }

    /// Check `code` against the pending recovery code.
    ///
    /// A wrong guess is counted; the [`MAX_RECOVERY_ATTEMPTS`]th one discards
    /// the pending code, so a new one has to be requested.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCode`] when no code is pending or it differs.
    pub fn check_recovery_code(&mut self, code: &str) -> Result<(), AuthError> {
        match &self.recovery_code {
            Some(expected) if expected == code.trim() => Ok(()),
            Some(_) => {
                self.recovery_attempts += 1;
                if self.recovery_attempts >= MAX_RECOVERY_ATTEMPTS {
                    self.recovery_code = None;
                    self.recovery_attempts = 0;
                }
                Err(AuthError::InvalidCode)
            }
            None => Err(AuthError::InvalidCode),
        }
    }

    /// Replace the password hash if `code` matches the pending recovery code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCode`] when no code is pending or it differs.
    pub fn reset_password(&mut self, code: &str, password_hash: String) -> Result<(), AuthError> {
        self.check_recovery_code(code)?;
        self.password_hash = password_hash;
        self.recovery_code = None;
        self.recovery_attempts = 0;
        Ok(())
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Registration form input.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Registration {
    /// Check registration input.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] for a blank username, a malformed
    /// email, or a password shorter than [`MIN_PASSWORD_LENGTH`].
    pub fn validate(&self) -> Result<(), MiniShopError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail.into());
        }
        validate_password(&self.password)
    }
}

/// Check password strength.
///
/// # Errors
///
/// Returns [`ValidationError::WeakPassword`] when the password is too short.
pub fn validate_password(password: &str) -> Result<(), MiniShopError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        }
        .into());
    }
    Ok(())
}

/// Emails are compared case-insensitively.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
