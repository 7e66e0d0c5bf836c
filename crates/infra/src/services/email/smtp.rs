use super::{EmailMessage, IMailer, MailerError};
use crate::config::{SmtpConfig, SmtpTls};
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::{error, warn};

struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Sends emails through an SMTP relay.
///
/// Without valid settings every send fails with `MailerError::NotConfigured`
/// instead of failing at startup.
pub struct SmtpMailer {
    inner: Option<SmtpTransport>,
}

impl SmtpMailer {
    pub fn new(config: Option<&SmtpConfig>) -> Self {
        let inner = config.and_then(|config| match Self::create_transport(config) {
            Ok(transport) => Some(transport),
            Err(e) => {
                error!("Unable to setup the SMTP transport: {:?}", e);
                None
            }
        });
        Self { inner }
    }

    fn create_transport(config: &SmtpConfig) -> Result<SmtpTransport, MailerError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|_| MailerError::InvalidAddress(config.from.clone()))?;

        let builder = match config.tls {
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailerError::Transport(e.to_string()))?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailerError::Transport(e.to_string()))?,
        };
        let builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of SMTP_USERNAME and SMTP_PASSWORD is set, connecting without authentication");
                builder
            }
            (None, None) => builder,
        };

        Ok(SmtpTransport {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(from: &Mailbox, message: &EmailMessage) -> Result<Message, MailerError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|_| MailerError::InvalidAddress(message.to.clone()))?;

        Message::builder()
            .from(from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|e| MailerError::Build(e.to_string()))
    }
}

#[async_trait::async_trait]
impl IMailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let smtp = self.inner.as_ref().ok_or(MailerError::NotConfigured)?;
        let email = Self::build_message(&smtp.from, message)?;

        smtp.transport
            .send(email)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: to.into(),
            subject: "Reminder: Gas Safety certification renewal".into(),
            html_body: "<p>Hi</p>".into(),
            text_body: "Hi".into(),
        }
    }

    fn config(from: &str) -> SmtpConfig {
        SmtpConfig {
            host: "localhost".into(),
            port: 1025,
            username: None,
            password: None,
            from: from.into(),
            tls: SmtpTls::None,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn fails_when_not_configured() {
        let mailer = SmtpMailer::new(None);
        let res = mailer.send(&message("sam@example.com")).await;
        assert!(matches!(res, Err(MailerError::NotConfigured)));
    }

    #[tokio::test]
    async fn invalid_sender_counts_as_not_configured() {
        let mailer = SmtpMailer::new(Some(&config("not an address")));
        let res = mailer.send(&message("sam@example.com")).await;
        assert!(matches!(res, Err(MailerError::NotConfigured)));
    }

    #[tokio::test]
    async fn rejects_invalid_recipient() {
        let mailer = SmtpMailer::new(Some(&config("Certwatch <no-reply@example.com>")));
        let res = mailer.send(&message("nobody")).await;
        assert!(matches!(res, Err(MailerError::InvalidAddress(_))));
    }
}
