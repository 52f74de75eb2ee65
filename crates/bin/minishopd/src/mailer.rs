//! Mailer that writes codes to the log instead of sending email.

use minishop_app::ports::Mailer;
use minishop_domain::error::MiniShopError;

/// Logs every code at `INFO`. Suitable for development and demos only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), MiniShopError> {
        tracing::info!(%email, %code, "verification code issued");
        Ok(())
    }

    async fn send_recovery_code(&self, email: &str, code: &str) -> Result<(), MiniShopError> {
        tracing::info!(%email, %code, "recovery code issued");
        Ok(())
    }
}
