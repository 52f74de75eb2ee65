//! Password hashing and one-time code generation.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;

use minishop_domain::error::AuthError;

/// Number of digits in verification and recovery codes.
pub const CODE_LENGTH: usize = 6;

/// Hash a password using Argon2id, returning a PHC string.
///
/// # Errors
///
/// Returns [`AuthError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] on mismatch or unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Random zero-padded numeric code.
#[must_use]
pub fn generate_code() -> String {
    let value: u32 = rand::rng().random_range(0..1_000_000);
    format!("{value:0width$}", width = CODE_LENGTH)
}
