use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::Notifier;
use crate::config::SmtpSettings;
use crate::error::{MonitorError, Result};

/// STARTTLS SMTP sender for one fixed recipient.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn from_settings(cfg: &SmtpSettings) -> Result<Self> {
        let creds = Credentials::new(cfg.sender.clone(), cfg.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.server)
            .map_err(|e| MonitorError::Config(format!("invalid SMTP_SERVER: {e}")))?
            .port(cfg.port)
            .credentials(creds)
            .build();

        let from = cfg
            .sender
            .parse()
            .map_err(|e| MonitorError::Config(format!("invalid SENDER_EMAIL: {e}")))?;
        let to = cfg
            .recipient
            .parse()
            .map_err(|e| MonitorError::Config(format!("invalid RECIPIENT_EMAIL: {e}")))?;

        Ok(Self { mailer, from, to })
    }

    fn build(&self, subject: &str, body: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MonitorError::Notify(format!("build email: {e}")))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let msg = self.build(subject, body)?;
        self.mailer
            .send(msg)
            .await
            .map_err(|e| MonitorError::Notify(format!("send email: {e}")))?;
        Ok(())
    }
}
