use super::Notifier;
use crate::error::Result;

/// Stand-in when SMTP is not configured: messages go to the log only.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        tracing::info!(%subject, %body, "email disabled (no SMTP settings)");
        Ok(())
    }
}
