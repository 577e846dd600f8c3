//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Identifier of a notification target (a chat user)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A post fetched from the content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Source-specific post ID, unique within the source
    pub id: String,
    /// Full, untruncated title (used for matching)
    pub title: String,
    /// Sub-feed the post came from (e.g. a subreddit name)
    pub feed: String,
    /// Canonical link to the post
    pub url: String,
    /// First link embedded in the post body, if any
    pub aux_link: Option<String>,
}

/// Which sub-feeds to fetch in one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSelector {
    pub feeds: Vec<String>,
}

impl FeedSelector {
    pub fn new<I, S>(feeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feeds: feeds.into_iter().map(Into::into).collect(),
        }
    }

    /// Feeds joined with `+`, the multi-feed syntax used by listing URLs
    pub fn joined(&self) -> String {
        self.feeds.join("+")
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

/// Ledger entry for a post that has been processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenPostRecord {
    pub post_id: String,
    /// Title truncated to [`crate::SEEN_TITLE_MAX_CHARS`]
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub first_seen_at: OffsetDateTime,
}

/// Result of inserting into the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkSeen {
    /// First time this post ID was recorded
    Recorded,
    /// The post ID was already present; nothing was written
    AlreadyRecorded,
}

/// Result of adding a (user, term) association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// Result of removing a (user, term) association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Structured summary of a post sent to the alert channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub title: String,
    pub url: String,
}

/// One outbound message for a post, in send order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Comma-separated mentions of every matched user
    Mentions(String),
    /// Title and canonical link
    Summary(PostSummary),
    /// First link extracted from the post body
    AuxLink(String),
}

impl OutboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mentions(_) => "mentions",
            Self::Summary(_) => "summary",
            Self::AuxLink(_) => "aux_link",
        }
    }
}

/// Outcome of looking up a matched user in the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResolution {
    /// Mention text for the user
    Found(String),
    NotFound,
    Failed(String),
}

/// Phases of one ingestion cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Deduplicating,
    Matching,
    Notifying,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Deduplicating => "deduplicating",
            Self::Matching => "matching",
            Self::Notifying => "notifying",
        };
        f.write_str(name)
    }
}

/// Processing result for a single fetched post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Already in the ledger; dropped
    AlreadySeen,
    /// Newly recorded but outside the alert feeds
    Recorded,
    /// Newly recorded and sent to the alert channel
    Notified {
        mentioned: Vec<UserId>,
        delivery_failures: usize,
    },
    /// Ledger or subscription storage failed for this post
    Failed { error: String },
}

/// Summary of one ingestion cycle
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Number of posts returned by the source
    pub fetched: usize,
    /// Per-post outcomes in fetch order
    pub outcomes: Vec<(String, PostOutcome)>,
    /// Set when shutdown stopped the cycle before every post was dequeued
    pub interrupted: bool,
}

impl CycleReport {
    /// Posts written to the ledger during this cycle
    pub fn new_posts(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PostOutcome::Recorded | PostOutcome::Notified { .. }))
            .count()
    }

    pub fn notified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PostOutcome::Notified { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PostOutcome::Failed { .. }))
            .count()
    }

    pub fn outcome(&self, post_id: &str) -> Option<&PostOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == post_id)
            .map(|(_, o)| o)
    }
}
