pub mod inmemory;
pub mod smtp;
pub mod template;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Email transport is not configured")]
    NotConfigured,
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Unable to build email: {0}")]
    Build(String),
    #[error("Unable to deliver email: {0}")]
    Transport(String),
}

/// Outbound email transport. A returned error means the message was not
/// accepted for delivery.
#[async_trait::async_trait]
pub trait IMailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}
