//! Keyword matching with per-user forbidden-word suppression

use std::collections::BTreeSet;

use crate::{
    model::{Post, UserId},
    ports::{StorageError, SubscriptionStore},
    text::title_contains,
};

fn is_suppressed(title_lower: &str, forbidden: &BTreeSet<String>) -> bool {
    forbidden
        .iter()
        .any(|word| title_contains(title_lower, word))
}

/// Matcher backed by a live subscription store
pub struct Matcher<'a, St: SubscriptionStore + ?Sized> {
    store: &'a St,
}

impl<'a, St: SubscriptionStore + ?Sized> Matcher<'a, St> {
    pub fn new(store: &'a St) -> Self {
        Self { store }
    }

    /// Users to notify for a post.
    ///
    /// A user whose forbidden words cannot be read is left out for this post.
    pub async fn match_post(&self, post: &Post) -> Result<BTreeSet<UserId>, StorageError> {
        let title_lower = post.title.to_lowercase();
        let active = self.store.list_keywords().await?;

        let mut candidates = BTreeSet::new();
        for keyword in active
            .iter()
            .filter(|k| title_contains(&title_lower, k))
        {
            candidates.extend(self.store.subscribers_of(keyword).await?);
        }

        let mut survivors = BTreeSet::new();
        for user in candidates {
            match self.store.forbidden_words_of(&user).await {
                Ok(words) if is_suppressed(&title_lower, &words) => {
                    tracing::debug!(post_id = %post.id, user_id = %user, "Suppressed by forbidden word");
                }
                Ok(_) => {
                    survivors.insert(user);
                }
                Err(error) => {
                    tracing::warn!(
                        post_id = %post.id,
                        user_id = %user,
                        error = %error,
                        "Failed to read forbidden words, excluding user"
                    );
                }
            }
        }

        Ok(survivors)
    }
}
