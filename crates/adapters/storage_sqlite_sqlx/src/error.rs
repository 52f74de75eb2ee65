//! Storage-specific error type wrapping sqlx errors.

use minishop_domain::error::MiniShopError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    fn database_error(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            Self::Database(err) => err.as_database_error(),
            Self::Migration(_) => None,
        }
    }

    /// The statement hit a `UNIQUE` constraint. Returns the offending column
    /// as reported by `SQLite` (`table.column`).
    pub(crate) fn unique_violation(&self) -> Option<&str> {
        let err = self.database_error()?;
        if !err.is_unique_violation() {
            return None;
        }
        err.message().rsplit(": ").next()
    }

    /// The statement hit a `FOREIGN KEY` constraint.
    pub(crate) fn is_foreign_key_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|err| err.is_foreign_key_violation())
    }
}

impl From<StorageError> for MiniShopError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
