// src/services/mailer.rs
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("Message build failed: {0}")]
    BuildFailed(String),

    #[error("SMTP send failed: {0}")]
    SendFailed(String),
}

/// Outbound SMTP mailer.
///
/// Delivery is fire-once: a failed send surfaces to the caller as-is, with
/// no retry or queueing, and the end user retries manually.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer").field("from", &self.from).finish()
    }
}

impl Mailer {
    /// Build a mailer from SMTP_* environment variables.
    ///
    /// Returns `Ok(None)` when SMTP_HOST is unset - the server runs without
    /// outbound mail and forgot-password reports the gap at request time.
    pub fn from_env() -> Result<Option<Self>, MailerError> {
        let host = match env::var("SMTP_HOST") {
            Ok(h) if !h.is_empty() => h,
            _ => return Ok(None),
        };

        let username = env::var("SMTP_USERNAME").unwrap_or_default();
        let password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_addr =
            env::var("SMTP_FROM").unwrap_or_else(|_| "no-reply@melody.local".to_string());

        let from: Mailbox = from_addr
            .parse()
            .map_err(|_| MailerError::InvalidAddress(from_addr.clone()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        if let Ok(port) = env::var("SMTP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                builder = builder.port(port);
            }
        }

        if !username.is_empty() {
            builder = builder.credentials(Credentials::new(username, password));
        }

        info!(smtp_host = %host, "SMTP mailer configured");

        Ok(Some(Self {
            transport: builder.build(),
            from,
        }))
    }

    /// Send the password-reset email carrying the raw token in a reset URL.
    /// The raw token exists only in this message; the store keeps its hash.
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        reset_url: &str,
    ) -> Result<(), MailerError> {
        let to: Mailbox = format!("{} <{}>", to_name, to_email)
            .parse()
            .map_err(|_| MailerError::InvalidAddress(to_email.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Reset your password")
            .header(ContentType::TEXT_HTML)
            .body(password_reset_body(to_name, reset_url))
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            warn!(
                error = %e,
                email = %safe_email_log(to_email),
                "Password reset email delivery failed"
            );
            MailerError::SendFailed(e.to_string())
        })?;

        info!(
            email = %safe_email_log(to_email),
            "Password reset email sent"
        );

        Ok(())
    }
}

/// HTML body for the password-reset email
fn password_reset_body(name: &str, reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #4F46E5; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #4F46E5; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Password Reset</h1>
        </div>
        <div class="content">
            <p>Hi {},</p>

            <p>We received a request to reset the password for your account. Click the button below to choose a new one.</p>

            <p><a class="button" href="{}">Reset Password</a></p>

            <p>This link expires in 5 minutes. If you did not request a reset, you can safely ignore this email - your password will not change.</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        name, reset_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_body_contains_link_and_expiry_notice() {
        let body = password_reset_body("Ann", "https://app.example.com/reset?token=abc123");

        assert!(body.contains("https://app.example.com/reset?token=abc123"));
        assert!(body.contains("Hi Ann,"));
        assert!(body.contains("5 minutes"));
    }
}
