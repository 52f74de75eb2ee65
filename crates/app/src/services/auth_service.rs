//! Auth service: registration, email verification, login and password recovery.

use minishop_domain::error::{AuthError, ConflictError, MiniShopError, NotFoundError};
use minishop_domain::id::UserId;
use minishop_domain::user::{Registration, User, normalize_email, validate_password};

use crate::password::{generate_code, hash_password, verify_password};
use crate::ports::{Mailer, UserRepository};

/// Application service for back-office accounts.
pub struct AuthService<U, M> {
    users: U,
    mailer: M,
}

impl<U, M> AuthService<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    /// Create a new service backed by the given repository and mailer.
    pub fn new(users: U, mailer: M) -> Self {
        Self { users, mailer }
    }

    /// Register a new, unverified account and mail its verification code.
    ///
    /// # Errors
    ///
    /// - [`MiniShopError::Validation`] for malformed input
    /// - [`MiniShopError::Conflict`] when the email or username is taken
    /// - [`MiniShopError::Auth`] when hashing fails
    /// - a storage or mailer error
    #[tracing::instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<User, MiniShopError> {
        registration.validate()?;

        let email = normalize_email(&registration.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ConflictError::Duplicate {
                entity: "User",
                field: "email",
            }
            .into());
        }
        if self
            .users
            .find_by_username(registration.username.trim())
            .await?
            .is_some()
        {
            return Err(ConflictError::Duplicate {
                entity: "User",
                field: "username",
            }
            .into());
        }

        let hash = hash_password(&registration.password)?;
        let code = generate_code();
        let user = self
            .users
            .create(User::register(&registration, hash, code.clone()))
            .await?;
        self.mailer.send_verification_code(&user.email, &code).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Confirm an email address with the code mailed at registration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCode`] for an unknown email or a wrong
    /// code, or a storage error.
    #[tracing::instrument(skip(self, code))]
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<User, MiniShopError> {
        let mut user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCode)?;
        user.verify(code)?;
        let user = self.users.update(user).await?;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(user)
    }

    /// Check credentials. `login` is either the username or the email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown account or a
    /// wrong password, [`AuthError::NotVerified`] when the email is not yet
    /// confirmed, or a storage error.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<User, MiniShopError> {
        let login = login.trim();
        let found = if login.contains('@') {
            self.users.find_by_email(&normalize_email(login)).await?
        } else {
            self.users.find_by_username(login).await?
        };
        let Some(user) = found else {
            tracing::warn!("login with unknown account");
            return Err(AuthError::InvalidCredentials.into());
        };
        if let Err(err) = verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(err.into());
        }
        if !user.verified {
            return Err(AuthError::NotVerified.into());
        }
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Mail a recovery code to the account registered with `email`.
    ///
    /// Unknown addresses are accepted silently.
    ///
    /// # Errors
    ///
    /// Returns a storage or mailer error.
    #[tracing::instrument(skip(self))]
    pub async fn start_recovery(&self, email: &str) -> Result<(), MiniShopError> {
        let Some(mut user) = self.users.find_by_email(&normalize_email(email)).await? else {
            tracing::info!("recovery requested for unknown email");
            return Ok(());
        };
        let code = generate_code();
        user.start_recovery(code.clone());
        let user = self.users.update(user).await?;
        self.mailer.send_recovery_code(&user.email, &code).await?;
        tracing::info!(user_id = %user.id, "recovery code sent");
        Ok(())
    }

    /// Set a new password using the mailed recovery code.
    ///
    /// The code is checked before the new password is hashed. Wrong codes
    /// are counted on the account and the pending code is discarded after
    /// [`MAX_RECOVERY_ATTEMPTS`](minishop_domain::user::MAX_RECOVERY_ATTEMPTS)
    /// of them.
    ///
    /// # Errors
    ///
    /// - [`MiniShopError::Validation`] when the new password is too weak
    /// - [`AuthError::InvalidCode`] for an unknown email or a wrong code
    /// - a storage error
    #[tracing::instrument(skip(self, code, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), MiniShopError> {
        validate_password(new_password)?;
        let mut user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCode)?;
        if let Err(err) = user.check_recovery_code(code) {
            let user = self.users.update(user).await?;
            tracing::warn!(
                user_id = %user.id,
                attempts = user.recovery_attempts,
                discarded = user.recovery_code.is_none(),
                "wrong recovery code"
            );
            return Err(err.into());
        }
        let hash = hash_password(new_password)?;
        user.reset_password(code, hash)?;
        let user = self.users.update(user).await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Load the account behind a session.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when the account no longer exists,
    /// or a storage error.
    pub async fn get_user(&self, id: UserId) -> Result<User, MiniShopError> {
        self.users.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "User",
                id: id.to_string(),
            }
            .into()
        })
    }
}
