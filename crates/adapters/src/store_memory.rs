//! In-memory store for adapter tests

use async_trait::async_trait;
use keyword_watch_domain::{
    AddOutcome, LedgerStore, MarkSeen, RemoveOutcome, SEEN_TITLE_MAX_CHARS, SeenPostRecord,
    StorageError, SubscriptionStore, UserId, text::truncate_chars,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use time::OffsetDateTime;

/// In-memory ledger and subscription store implementation
pub struct InMemoryStore {
    seen: RwLock<Vec<SeenPostRecord>>,
    seen_index: RwLock<HashMap<String, usize>>,
    users: RwLock<BTreeSet<UserId>>,
    keywords: RwLock<BTreeSet<(String, UserId)>>,
    forbidden: RwLock<BTreeSet<(UserId, String)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            seen: RwLock::new(Vec::new()),
            seen_index: RwLock::new(HashMap::new()),
            users: RwLock::new(BTreeSet::new()),
            keywords: RwLock::new(BTreeSet::new()),
            forbidden: RwLock::new(BTreeSet::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Database(e.to_string())
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn has_seen(&self, post_id: &str) -> Result<bool, StorageError> {
        let index = self.seen_index.read().map_err(lock_error)?;
        Ok(index.contains_key(post_id))
    }

    async fn mark_seen(
        &self,
        post_id: &str,
        title: &str,
        seen_at: OffsetDateTime,
    ) -> Result<MarkSeen, StorageError> {
        let mut index = self.seen_index.write().map_err(lock_error)?;
        if index.contains_key(post_id) {
            return Ok(MarkSeen::AlreadyRecorded);
        }

        let mut seen = self.seen.write().map_err(lock_error)?;
        index.insert(post_id.to_string(), seen.len());
        seen.push(SeenPostRecord {
            post_id: post_id.to_string(),
            title: truncate_chars(title, SEEN_TITLE_MAX_CHARS).to_string(),
            first_seen_at: seen_at,
        });
        Ok(MarkSeen::Recorded)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SeenPostRecord>, StorageError> {
        let seen = self.seen.read().map_err(lock_error)?;
        Ok(seen.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn list_keywords(&self) -> Result<BTreeSet<String>, StorageError> {
        let keywords = self.keywords.read().map_err(lock_error)?;
        Ok(keywords.iter().map(|(k, _)| k.clone()).collect())
    }

    async fn subscribers_of(&self, keyword: &str) -> Result<Vec<UserId>, StorageError> {
        let keywords = self.keywords.read().map_err(lock_error)?;
        Ok(keywords
            .iter()
            .filter(|(k, _)| k == keyword)
            .map(|(_, u)| u.clone())
            .collect())
    }

    async fn forbidden_words_of(&self, user: &UserId) -> Result<BTreeSet<String>, StorageError> {
        let forbidden = self.forbidden.read().map_err(lock_error)?;
        Ok(forbidden
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(_, w)| w.clone())
            .collect())
    }

    async fn keywords_of(&self, user: &UserId) -> Result<BTreeSet<String>, StorageError> {
        let keywords = self.keywords.read().map_err(lock_error)?;
        Ok(keywords
            .iter()
            .filter(|(_, u)| u == user)
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn add_keyword(&self, user: &UserId, keyword: &str) -> Result<AddOutcome, StorageError> {
        self.upsert_user(user).await?;
        let mut keywords = self.keywords.write().map_err(lock_error)?;
        Ok(if keywords.insert((keyword.to_string(), user.clone())) {
            AddOutcome::Added
        } else {
            AddOutcome::AlreadyExists
        })
    }

    async fn remove_keyword(
        &self,
        user: &UserId,
        keyword: &str,
    ) -> Result<RemoveOutcome, StorageError> {
        let mut keywords = self.keywords.write().map_err(lock_error)?;
        Ok(if keywords.remove(&(keyword.to_string(), user.clone())) {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        })
    }

    async fn add_forbidden_word(
        &self,
        user: &UserId,
        word: &str,
    ) -> Result<AddOutcome, StorageError> {
        self.upsert_user(user).await?;
        let mut forbidden = self.forbidden.write().map_err(lock_error)?;
        Ok(if forbidden.insert((user.clone(), word.to_string())) {
            AddOutcome::Added
        } else {
            AddOutcome::AlreadyExists
        })
    }

    async fn remove_forbidden_word(
        &self,
        user: &UserId,
        word: &str,
    ) -> Result<RemoveOutcome, StorageError> {
        let mut forbidden = self.forbidden.write().map_err(lock_error)?;
        Ok(if forbidden.remove(&(user.clone(), word.to_string())) {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        })
    }

    async fn upsert_user(&self, user: &UserId) -> Result<(), StorageError> {
        let mut users = self.users.write().map_err(lock_error)?;
        users.insert(user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_seen_once() {
        let store = InMemoryStore::new();
        let now = OffsetDateTime::now_utc();

        assert!(!store.has_seen("p1").await.unwrap());
        assert_eq!(store.mark_seen("p1", "t", now).await.unwrap(), MarkSeen::Recorded);
        assert_eq!(
            store.mark_seen("p1", "t", now).await.unwrap(),
            MarkSeen::AlreadyRecorded
        );
        assert_eq!(store.recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recent_newest_first_with_limit() {
        let store = InMemoryStore::new();
        let now = OffsetDateTime::now_utc();
        for id in ["a", "b", "c"] {
            store.mark_seen(id, id, now).await.unwrap();
        }

        let ids: Vec<_> = store
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.post_id)
            .collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_remove_last_subscriber_deactivates_keyword() {
        let store = InMemoryStore::new();
        let user = UserId::new("7");

        store.add_keyword(&user, "nk").await.unwrap();
        assert!(store.list_keywords().await.unwrap().contains("nk"));

        store.remove_keyword(&user, "nk").await.unwrap();
        assert!(store.list_keywords().await.unwrap().is_empty());
        assert_eq!(
            store.remove_keyword(&user, "nk").await.unwrap(),
            RemoveOutcome::NotFound
        );
    }
}
