//! `SQLite` implementation of [`UserRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use minishop_app::ports::UserRepository;
use minishop_domain::error::{ConflictError, MiniShopError, NotFoundError};
use minishop_domain::id::UserId;
use minishop_domain::user::User;

use crate::error::StorageError;
use crate::row::{format_timestamp, parse, parse_timestamp, to_u32};

/// Wrapper for converting database rows into domain [`User`].
struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let since: String = row.try_get("since")?;
        let recovery_attempts: i64 = row.try_get("recovery_attempts")?;

        Ok(Self(User {
            id: parse(&id)?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            verified: row.try_get("verified")?,
            verification_code: row.try_get("verification_code")?,
            recovery_code: row.try_get("recovery_code")?,
            recovery_attempts: to_u32(recovery_attempts)?,
            since: parse_timestamp(&since)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO users (id, first_name, last_name, email, username, password_hash, verified,
        verification_code, recovery_code, recovery_attempts, since)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_BY_EMAIL: &str = "SELECT * FROM users WHERE email = ?";
const SELECT_BY_USERNAME: &str = "SELECT * FROM users WHERE username = ?";
const UPDATE: &str = r"
    UPDATE users SET first_name = ?, last_name = ?, email = ?, username = ?, password_hash = ?,
        verified = ?, verification_code = ?, recovery_code = ?, recovery_attempts = ?
    WHERE id = ?
";

/// `SQLite`-backed account repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn find_one(
    pool: SqlitePool,
    query: &'static str,
    value: String,
) -> Result<Option<User>, MiniShopError> {
    let row: Option<Wrapper> = sqlx::query_as(query)
        .bind(value)
        .fetch_optional(&pool)
        .await
        .map_err(StorageError::from)?;

    Ok(Wrapper::maybe(row))
}

fn duplicate(err: &StorageError) -> Option<ConflictError> {
    let column = err.unique_violation()?;
    let field = if column.ends_with("username") {
        "username"
    } else {
        "email"
    };
    Some(ConflictError::Duplicate {
        entity: "User",
        field,
    })
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, user: User) -> impl Future<Output = Result<User, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(user.id.to_string())
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.email)
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.verified)
                .bind(&user.verification_code)
                .bind(&user.recovery_code)
                .bind(i64::from(user.recovery_attempts))
                .bind(format_timestamp(&user.since))
                .execute(&pool)
                .await
                .map_err(StorageError::from);

            match result {
                Ok(_) => Ok(user),
                Err(err) => Err(duplicate(&err).map_or_else(|| err.into(), Into::into)),
            }
        }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send {
        find_one(self.pool.clone(), SELECT_BY_ID, id.to_string())
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send {
        find_one(self.pool.clone(), SELECT_BY_EMAIL, email.to_string())
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send {
        find_one(self.pool.clone(), SELECT_BY_USERNAME, username.to_string())
    }

    fn update(&self, user: User) -> impl Future<Output = Result<User, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.email)
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.verified)
                .bind(&user.verification_code)
                .bind(&user.recovery_code)
                .bind(i64::from(user.recovery_attempts))
                .bind(user.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from);

            match result {
                Ok(done) if done.rows_affected() == 0 => Err(NotFoundError {
                    entity: "User",
                    id: user.id.to_string(),
                }
                .into()),
                Ok(_) => Ok(user),
                Err(err) => Err(duplicate(&err).map_or_else(|| err.into(), Into::into)),
            }
        }
    }
}
