//! Mailer port: outbound delivery of one-time codes.

use std::future::Future;

use minishop_domain::error::MiniShopError;

/// Sends account codes to users.
pub trait Mailer {
    /// Deliver the code that confirms ownership of `email` after registration.
    fn send_verification_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), MiniShopError>> + Send;

    /// Deliver the code that authorizes a password reset.
    fn send_recovery_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), MiniShopError>> + Send;
}
