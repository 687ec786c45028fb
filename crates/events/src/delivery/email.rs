//! SMTP delivery for notification emails.
//!
//! Email is optional: [`EmailConfig::from_env`] answers `None` when
//! `SMTP_HOST` is absent and the notification router then skips the email
//! leg entirely. Messages are plain text with a `[PostPilot]` subject
//! prefix.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "noreply@postpilot.local";

/// Why an email could not be sent.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Connection, STARTTLS, or authentication failure.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// Sender or recipient address did not parse.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message itself could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// SMTP connection settings.
///
/// Env vars: `SMTP_HOST` (required for email at all), `SMTP_PORT` (587),
/// `SMTP_FROM` (`noreply@postpilot.local`), `SMTP_USER` / `SMTP_PASSWORD`
/// (anonymous relay when unset).
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub from_address: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl EmailConfig {
    /// Read SMTP settings from the environment; `None` without `SMTP_HOST`.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            username: std::env::var("SMTP_USER").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends notification emails over STARTTLS SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send one plain-text email. The subject is prefixed with
    /// `[PostPilot]`.
    pub async fn deliver(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(format!("[PostPilot] {subject}"))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport()?.send(message).await?;

        tracing::info!(to = to_email, subject, "Notification email sent");
        Ok(())
    }

    /// Build the SMTP transport. Cheap; nothing connects until `send`.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
            .port(self.config.port);

        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_is_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn build_errors_carry_their_reason() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn bad_addresses_map_to_address_errors() {
        let parse: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::from(parse.unwrap_err());
        assert!(err.to_string().starts_with("Email address parse error"));
    }
}
