use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::AppError;
use crate::proximity::{LevelKind, ProximityEvent};

use super::Notifier;

const SMTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Recipient, sender account and its app password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailCredentials {
    pub recipient: String,
    pub sender: String,
    pub password: String,
}

impl MailCredentials {
    pub fn new(recipient: &str, sender: &str, password: &str) -> Self {
        Self {
            recipient: recipient.trim().to_string(),
            sender: sender.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.recipient.is_empty() && !self.sender.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn for_event(event: &ProximityEvent) -> Self {
        let subject = match event.kind {
            LevelKind::Support => "Support Alert",
            LevelKind::Resistance => "Resistance Alert",
        };
        Self {
            subject: subject.to_string(),
            body: format!(
                "{} is near {} at {:.2}. Current: {:.2}",
                event.symbol,
                event.kind.as_tag(),
                event.level(),
                event.price
            ),
        }
    }

    /// Sent from the dashboard's "test notification" control.
    pub fn test() -> Self {
        Self {
            subject: "Test Crypto Alert".to_string(),
            body: "This is a test alert from level-watch.".to_string(),
        }
    }
}

/// Plain-text mail over implicit-TLS SMTP.
pub struct SmtpNotifier {
    host: String,
    port: u16,
}

impl SmtpNotifier {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    fn build_message(
        message: &Notification,
        credentials: &MailCredentials,
    ) -> Result<Message, AppError> {
        let from: Mailbox = credentials
            .sender
            .parse()
            .map_err(|e| AppError::Notify(format!("invalid sender address: {}", e)))?;
        let to: Mailbox = credentials
            .recipient
            .parse()
            .map_err(|e| AppError::Notify(format!("invalid recipient address: {}", e)))?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| AppError::Notify(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, message: &Notification, credentials: &MailCredentials) -> Result<(), AppError> {
        if !credentials.is_complete() {
            return Err(AppError::Notify(
                "recipient, sender and password are required".to_string(),
            ));
        }
        let email = Self::build_message(message, credentials)?;
        let mailer = SmtpTransport::relay(&self.host)
            .map_err(|e| AppError::Notify(e.to_string()))?
            .port(self.port)
            .timeout(Some(SMTP_TIMEOUT))
            .credentials(Credentials::new(
                credentials.sender.clone(),
                credentials.password.clone(),
            ))
            .build();
        mailer
            .send(&email)
            .map_err(|e| AppError::Notify(e.to_string()))?;
        tracing::info!(subject = %message.subject, to = %credentials.recipient, "Notification sent");
        Ok(())
    }
}
