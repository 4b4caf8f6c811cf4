use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::AppError;

/// An outbound HTML email.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub html: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub to: Vec<String>,
}

impl OutgoingEmail {
    /// Build the RFC 5322 message. Fails on unparsable addresses or no recipients.
    pub fn to_message(&self) -> Result<Message, AppError> {
        let parse = |addr: &str| {
            addr.parse::<Mailbox>()
                .map_err(|e| AppError::Mail(format!("Invalid address '{addr}': {e}")))
        };

        if self.to.is_empty() {
            return Err(AppError::Mail("No recipients".into()));
        }

        let mut builder = Message::builder()
            .from(parse(&self.from)?)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(parse(reply_to)?);
        }
        for recipient in &self.to {
            builder = builder.to(parse(recipient)?);
        }

        builder
            .body(self.html.clone())
            .map_err(|e| AppError::Mail(format!("Failed to build message: {e}")))
    }
}

/// Outbound mail transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError>;
}

/// SMTP relay using STARTTLS (or implicit TLS on port 465).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, user: Option<String>, pass: Option<String>) -> Result<Self, AppError> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| AppError::Config(format!("Invalid SMTP host '{host}': {e}")))?
        .port(port);

        let builder = match (user, pass) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user, pass)),
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        let message = email.to_message()?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

/// Sends admin notifications through a [`Mailer`] with fixed sender and recipient.
#[derive(Clone)]
pub struct Notifier {
    pub mailer: Arc<dyn Mailer>,
    pub from: String,
    pub admin: String,
}

impl Notifier {
    /// Best-effort: a delivery failure is logged and swallowed.
    pub async fn quote_received(&self, quote: &crate::db::models::QuoteRequest) {
        let email = crate::mail::templates::quote_notification(quote, &self.from, &self.admin);
        match self.mailer.send(email).await {
            Ok(()) => tracing::info!(quote_id = %quote.id, "quote notification sent"),
            Err(e) => tracing::warn!(quote_id = %quote.id, "Failed to send quote notification: {e}"),
        }
    }
}
