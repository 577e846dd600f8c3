//! SQLite ledger and subscription store implementation

use async_trait::async_trait;
use keyword_watch_domain::{
    AddOutcome, LedgerStore, MarkSeen, RemoveOutcome, SEEN_TITLE_MAX_CHARS, SeenPostRecord,
    StorageError, SubscriptionStore, UserId, text::truncate_chars,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::collections::BTreeSet;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// SQLite-backed store for seen posts, users, keywords and forbidden words
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database file, creating it and its tables if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Database(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(db_error)?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_error)?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS seen_posts (
                post_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                first_seen_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS keywords_users (
                keyword TEXT NOT NULL,
                user_id TEXT NOT NULL REFERENCES users(user_id),
                PRIMARY KEY (keyword, user_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS forbidden_words_users (
                user_id TEXT NOT NULL REFERENCES users(user_id),
                word TEXT NOT NULL,
                PRIMARY KEY (user_id, word)
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_keywords_users_user
            ON keywords_users(user_id)
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }

        Ok(())
    }

    async fn insert_user(&self, user: &UserId) -> Result<(), StorageError> {
        let now = now_rfc3339()?;
        sqlx::query("INSERT INTO users (user_id, created_at) VALUES (?, ?) ON CONFLICT(user_id) DO NOTHING")
            .bind(user.as_str())
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn insert_pair(&self, sql: &str, first: &str, second: &str) -> Result<AddOutcome, StorageError> {
        let result = sqlx::query(sql)
            .bind(first)
            .bind(second)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(if result.rows_affected() == 0 {
            AddOutcome::AlreadyExists
        } else {
            AddOutcome::Added
        })
    }

    async fn delete_pair(&self, sql: &str, first: &str, second: &str) -> Result<RemoveOutcome, StorageError> {
        let result = sqlx::query(sql)
            .bind(first)
            .bind(second)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(if result.rows_affected() == 0 {
            RemoveOutcome::NotFound
        } else {
            RemoveOutcome::Removed
        })
    }

    async fn strings(&self, sql: &str, bind: &str) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as(sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|(value,)| value).collect())
    }
}

fn db_error(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

fn now_rfc3339() -> Result<String, StorageError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn has_seen(&self, post_id: &str) -> Result<bool, StorageError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM seen_posts WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(count.0 > 0)
    }

    async fn mark_seen(
        &self,
        post_id: &str,
        title: &str,
        seen_at: OffsetDateTime,
    ) -> Result<MarkSeen, StorageError> {
        let seen_at_str = seen_at
            .format(&Rfc3339)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO seen_posts (post_id, title, first_seen_at)
            VALUES (?, ?, ?)
            ON CONFLICT(post_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(truncate_chars(title, SEEN_TITLE_MAX_CHARS))
        .bind(&seen_at_str)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(if result.rows_affected() == 0 {
            MarkSeen::AlreadyRecorded
        } else {
            MarkSeen::Recorded
        })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SeenPostRecord>, StorageError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT post_id, title, first_seen_at
            FROM seen_posts
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(post_id, title, first_seen_at_str)| {
                let first_seen_at = OffsetDateTime::parse(&first_seen_at_str, &Rfc3339)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(SeenPostRecord {
                    post_id,
                    title,
                    first_seen_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl SubscriptionStore for SqliteStore {
    async fn list_keywords(&self) -> Result<BTreeSet<String>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT keyword FROM keywords_users")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|(keyword,)| keyword).collect())
    }

    async fn subscribers_of(&self, keyword: &str) -> Result<Vec<UserId>, StorageError> {
        let users = self
            .strings(
                "SELECT DISTINCT user_id FROM keywords_users WHERE keyword = ? ORDER BY user_id",
                keyword,
            )
            .await?;
        Ok(users.into_iter().map(UserId::new).collect())
    }

    async fn forbidden_words_of(&self, user: &UserId) -> Result<BTreeSet<String>, StorageError> {
        let words = self
            .strings(
                "SELECT word FROM forbidden_words_users WHERE user_id = ?",
                user.as_str(),
            )
            .await?;
        Ok(words.into_iter().collect())
    }

    async fn keywords_of(&self, user: &UserId) -> Result<BTreeSet<String>, StorageError> {
        let keywords = self
            .strings(
                "SELECT keyword FROM keywords_users WHERE user_id = ?",
                user.as_str(),
            )
            .await?;
        Ok(keywords.into_iter().collect())
    }

    async fn add_keyword(&self, user: &UserId, keyword: &str) -> Result<AddOutcome, StorageError> {
        self.insert_user(user).await?;
        self.insert_pair(
            "INSERT INTO keywords_users (keyword, user_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
            keyword,
            user.as_str(),
        )
        .await
    }

    async fn remove_keyword(
        &self,
        user: &UserId,
        keyword: &str,
    ) -> Result<RemoveOutcome, StorageError> {
        self.delete_pair(
            "DELETE FROM keywords_users WHERE keyword = ? AND user_id = ?",
            keyword,
            user.as_str(),
        )
        .await
    }

    async fn add_forbidden_word(
        &self,
        user: &UserId,
        word: &str,
    ) -> Result<AddOutcome, StorageError> {
        self.insert_user(user).await?;
        self.insert_pair(
            "INSERT INTO forbidden_words_users (user_id, word) VALUES (?, ?) ON CONFLICT DO NOTHING",
            user.as_str(),
            word,
        )
        .await
    }

    async fn remove_forbidden_word(
        &self,
        user: &UserId,
        word: &str,
    ) -> Result<RemoveOutcome, StorageError> {
        self.delete_pair(
            "DELETE FROM forbidden_words_users WHERE user_id = ? AND word = ?",
            user.as_str(),
            word,
        )
        .await
    }

    async fn upsert_user(&self, user: &UserId) -> Result<(), StorageError> {
        self.insert_user(user).await
    }
}
