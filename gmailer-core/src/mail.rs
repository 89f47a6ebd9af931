use anyhow::{Context, Result};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::MultiPart,
    transport::smtp::authentication::Credentials,
};

use crate::{config::Config, model::EmailBody};

pub const GMAIL_RELAY: &str = "smtp.gmail.com";

/// Sends one message per call over an authenticated TLS session.
///
/// Failures here are fatal to the run; there is no retry.
#[derive(Debug, Clone)]
pub struct Mailer {
    relay: String,
}

impl Mailer {
    pub fn new() -> Self {
        Self { relay: GMAIL_RELAY.to_string() }
    }

    pub fn with_relay(relay: impl Into<String>) -> Self {
        Self { relay: relay.into() }
    }

    /// Send `body` as a `multipart/alternative` message, authenticating with
    /// the sender address and app password.
    pub async fn send(&self, config: &Config, subject: &str, body: &EmailBody) -> Result<()> {
        let message =
            build_message(&config.sender_email, &config.receiver_email, subject, body)?;

        let credentials =
            Credentials::new(config.sender_email.clone(), config.app_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.relay)
            .with_context(|| format!("Failed to configure SMTP relay {}", self.relay))?
            .credentials(credentials)
            .build();

        transport
            .send(message)
            .await
            .with_context(|| format!("Failed to send email via {}", self.relay))?;

        tracing::info!(relay = %self.relay, to = %config.receiver_email, "email sent");

        Ok(())
    }
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_message(from: &str, to: &str, subject: &str, body: &EmailBody) -> Result<Message> {
    Message::builder()
        .from(from.parse().with_context(|| format!("Invalid sender address: {from}"))?)
        .to(to.parse().with_context(|| format!("Invalid receiver address: {to}"))?)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(
            body.text.clone(),
            body.html.clone(),
        ))
        .context("Failed to build email message")
}
