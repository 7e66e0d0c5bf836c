use super::{EmailMessage, IMailer, MailerError};
use std::sync::{Mutex, MutexGuard};

/// Mailer that keeps sent messages in memory. Recipients registered with
/// `fail_for` are rejected like a relay refusing the message.
#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing_recipients: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: &str) {
        lock(&self.failing_recipients).push(recipient.to_string());
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        if lock(&self.failing_recipients).contains(&message.to) {
            return Err(MailerError::Transport(format!(
                "Recipient {} rejected",
                message.to
            )));
        }
        lock(&self.sent).push(message.clone());
        Ok(())
    }
}
