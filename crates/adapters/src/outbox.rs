//! Outbox sink writing alert messages to a JSONL file for review.

use async_trait::async_trait;
use keyword_watch_domain::{NotificationSink, NotifyError, PostSummary};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct OutboxSink {
    file: Arc<Mutex<tokio::fs::File>>,
}

impl OutboxSink {
    pub async fn new(path: PathBuf) -> Result<Self, OutboxError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    async fn append(&self, entry: &OutboxEntry<'_>) -> Result<(), NotifyError> {
        let line = serde_json::to_string(entry).map_err(OutboxError::from)?;
        let mut file = self.file.lock().await;
        write_line(&mut file, &line).await?;
        Ok(())
    }
}

impl From<OutboxError> for NotifyError {
    fn from(e: OutboxError) -> Self {
        NotifyError::Io(format!("Outbox write failed: {}", e))
    }
}

async fn write_line(file: &mut tokio::fs::File, line: &str) -> Result<(), OutboxError> {
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutboxMessage<'a> {
    Text { text: &'a str },
    Summary { title: &'a str, url: &'a str },
}

#[derive(Serialize)]
struct OutboxEntry<'a> {
    id: Uuid,
    channel: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    written_at: OffsetDateTime,
    #[serde(flatten)]
    message: OutboxMessage<'a>,
}

impl<'a> OutboxEntry<'a> {
    fn new(channel: &'a str, message: OutboxMessage<'a>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            written_at: OffsetDateTime::now_utc(),
            message,
        }
    }
}

#[async_trait]
impl NotificationSink for OutboxSink {
    async fn send_text(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        self.append(&OutboxEntry::new(channel, OutboxMessage::Text { text }))
            .await
    }

    async fn send_summary(&self, channel: &str, summary: &PostSummary) -> Result<(), NotifyError> {
        self.append(&OutboxEntry::new(
            channel,
            OutboxMessage::Summary {
                title: &summary.title,
                url: &summary.url,
            },
        ))
        .await
    }

    fn name(&self) -> &'static str {
        "outbox"
    }
}
