//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{
    AddOutcome, FeedSelector, MarkSeen, Post, PostSummary, RemoveOutcome, SeenPostRecord, UserId,
};

/// Error type for content source operations
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited, retry after: {0:?}")]
    RateLimited(Option<std::time::Duration>),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Port for fetching the current listing of posts
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch currently visible posts across the selected feeds
    async fn fetch_posts(&self, selector: &FeedSelector) -> Result<Vec<Post>, FetchError>;
}

/// Error type for notification delivery and user lookup
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    /// Failure writing to a local destination such as a file
    #[error("Local I/O error: {0}")]
    Io(String),
}

/// Port for delivering messages to a channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_text(&self, channel: &str, text: &str) -> Result<(), NotifyError>;

    async fn send_summary(&self, channel: &str, summary: &PostSummary)
    -> Result<(), NotifyError>;

    /// Short sink name for logs (e.g. "discord", "outbox")
    fn name(&self) -> &'static str;
}

/// Port for turning a user ID into mention text
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when the user no longer exists on the chat platform
    async fn resolve(&self, user: &UserId) -> Result<Option<String>, NotifyError>;
}

/// Error type for ledger and subscription storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Append-only record of processed post IDs
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Whether the post ID has a ledger entry; unknown IDs are `false`
    async fn has_seen(&self, post_id: &str) -> Result<bool, StorageError>;

    /// Insert-if-absent. The title is truncated by the store.
    async fn mark_seen(
        &self,
        post_id: &str,
        title: &str,
        seen_at: OffsetDateTime,
    ) -> Result<MarkSeen, StorageError>;

    /// Most recently recorded posts, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<SeenPostRecord>, StorageError>;
}

/// Keyword subscriptions and forbidden words per user.
///
/// Terms passed in are expected to be normalized with
/// [`crate::text::normalize_term`].
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Distinct keywords with at least one subscriber
    async fn list_keywords(&self) -> Result<BTreeSet<String>, StorageError>;

    /// Subscribers of a keyword, deduplicated
    async fn subscribers_of(&self, keyword: &str) -> Result<Vec<UserId>, StorageError>;

    async fn forbidden_words_of(&self, user: &UserId) -> Result<BTreeSet<String>, StorageError>;

    async fn keywords_of(&self, user: &UserId) -> Result<BTreeSet<String>, StorageError>;

    async fn add_keyword(&self, user: &UserId, keyword: &str) -> Result<AddOutcome, StorageError>;

    async fn remove_keyword(
        &self,
        user: &UserId,
        keyword: &str,
    ) -> Result<RemoveOutcome, StorageError>;

    async fn add_forbidden_word(
        &self,
        user: &UserId,
        word: &str,
    ) -> Result<AddOutcome, StorageError>;

    async fn remove_forbidden_word(
        &self,
        user: &UserId,
        word: &str,
    ) -> Result<RemoveOutcome, StorageError>;

    /// Idempotent insert of a user row
    async fn upsert_user(&self, user: &UserId) -> Result<(), StorageError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
