//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts them into
//! [`MiniShopError`] via `#[from]`.

use crate::product::Category;

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum MiniShopError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Opaque persistence failure; adapters box their own error type here.
    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated by user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("model must not be empty")]
    EmptyModel,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("price must not be negative")]
    NegativePrice,

    #[error("display size must not be negative")]
    NegativeDisplaySize,

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("{field} must be a non-negative number")]
    InvalidNumber { field: &'static str },

    #[error("invalid {entity} id: {value}")]
    InvalidId { entity: &'static str, value: String },

    #[error("a {from} cannot be turned into a {to}")]
    CategoryChange { from: Category, to: Category },
}

/// The requested record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The operation conflicts with the current state of the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("insufficient stock for product {model}: requested {requested}, available {available}")]
    InsufficientStock {
        model: String,
        requested: u32,
        available: u32,
    },

    #[error("a {entity} with this {field} already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} {id} is still referenced")]
    InUse { entity: &'static str, id: String },
}

/// Credential or code checks failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account email is not verified")]
    NotVerified,

    #[error("invalid or expired code")]
    InvalidCode,

    #[error("password hashing failed")]
    PasswordHash,
}
