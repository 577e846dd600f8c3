//! Dry-run adapters

use async_trait::async_trait;
use keyword_watch_domain::{NotificationSink, NotifyError, PostSummary};

/// Dry-run sink that only logs what would be sent
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send_text(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        tracing::info!(channel = %channel, text = %text, "[DRY RUN] Would send message");
        Ok(())
    }

    async fn send_summary(&self, channel: &str, summary: &PostSummary) -> Result<(), NotifyError> {
        tracing::info!(
            channel = %channel,
            title = %summary.title,
            url = %summary.url,
            "[DRY RUN] Would send summary"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
