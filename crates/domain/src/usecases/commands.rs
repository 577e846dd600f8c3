//! Subscription management commands and their replies

use std::fmt;
use std::sync::Arc;

use crate::{
    model::{AddOutcome, RemoveOutcome, UserId},
    ports::{StorageError, SubscriptionStore},
    text::normalize_term,
};

/// Prefix for chat commands
pub const COMMAND_PREFIX: char = '!';

/// Which per-user term list a command touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Keyword,
    ForbiddenWord,
}

impl TermKind {
    fn label(self) -> &'static str {
        match self {
            Self::Keyword => "keywords",
            Self::ForbiddenWord => "forbidden words",
        }
    }
}

/// A subscription command issued by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(TermKind, String),
    Remove(TermKind, String),
    List(TermKind),
}

impl Command {
    /// Parse a chat message such as `!ak gmk olivia`.
    ///
    /// Returns `None` for anything that is not a known command. Arguments are
    /// joined with single spaces.
    pub fn parse(message: &str) -> Option<Self> {
        let rest = message.trim().strip_prefix(COMMAND_PREFIX)?;
        let mut words = rest.split_whitespace();
        let name = words.next()?;
        let term = words.collect::<Vec<_>>().join(" ");

        let command = match name {
            "add_keyword" | "ak" => Self::Add(TermKind::Keyword, term),
            "remove_keyword" | "rk" => Self::Remove(TermKind::Keyword, term),
            "get_keywords" | "gk" => Self::List(TermKind::Keyword),
            "add_forbidden_word" | "afw" => Self::Add(TermKind::ForbiddenWord, term),
            "remove_forbidden_word" | "rfw" => Self::Remove(TermKind::ForbiddenWord, term),
            "get_forbidden_words" | "gfw" => Self::List(TermKind::ForbiddenWord),
            _ => return None,
        };
        Some(command)
    }
}

/// Fixed set of command outcomes shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotFound,
    Listed,
    Invalid,
    InternalFailure,
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "added",
            Self::AlreadyPresent => "already_present",
            Self::Removed => "removed",
            Self::NotFound => "not_found",
            Self::Listed => "listed",
            Self::Invalid => "invalid",
            Self::InternalFailure => "internal_failure",
        };
        f.write_str(name)
    }
}

/// Reply to a command: the outcome plus user-facing text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub outcome: CommandOutcome,
    pub text: String,
}

impl CommandReply {
    fn new(outcome: CommandOutcome, text: impl Into<String>) -> Self {
        Self {
            outcome,
            text: text.into(),
        }
    }

    fn internal_failure(kind: TermKind) -> Self {
        Self::new(
            CommandOutcome::InternalFailure,
            format!("Something went wrong updating your {}. Please try again later.", kind.label()),
        )
    }
}

/// Handler for the subscription management surface
pub struct SubscriptionCommands<St: SubscriptionStore + ?Sized> {
    store: Arc<St>,
}

impl<St: SubscriptionStore + ?Sized> SubscriptionCommands<St> {
    pub fn new(store: Arc<St>) -> Self {
        Self { store }
    }

    /// Execute a command on behalf of `user`
    pub async fn handle(&self, user: &UserId, command: Command) -> CommandReply {
        match command {
            Command::Add(kind, term) => self.add(user, kind, &term).await,
            Command::Remove(kind, term) => self.remove(user, kind, &term).await,
            Command::List(kind) => self.list(user, kind).await,
        }
    }

    /// Join event: make sure the user row exists
    pub async fn register_user(&self, user: &UserId) -> Result<(), StorageError> {
        self.store.upsert_user(user).await.inspect_err(|e| {
            tracing::warn!(user_id = %user, error = %e, "Failed to register user");
        })
    }

    async fn add(&self, user: &UserId, kind: TermKind, raw: &str) -> CommandReply {
        let Some(term) = normalize_term(raw) else {
            return invalid_term(kind);
        };

        let result = match kind {
            TermKind::Keyword => self.store.add_keyword(user, &term).await,
            TermKind::ForbiddenWord => self.store.add_forbidden_word(user, &term).await,
        };

        match result {
            Ok(AddOutcome::Added) => {
                tracing::info!(user_id = %user, term = %term, kind = kind.label(), "Term added");
                CommandReply::new(
                    CommandOutcome::Added,
                    format!("Added **{}** to your {}.", term, kind.label()),
                )
            }
            Ok(AddOutcome::AlreadyExists) => CommandReply::new(
                CommandOutcome::AlreadyPresent,
                format!("**{}** is already in your {}.", term, kind.label()),
            ),
            Err(e) => {
                tracing::error!(user_id = %user, term = %term, operation = "add", error = %e, "Command failed");
                CommandReply::internal_failure(kind)
            }
        }
    }

    async fn remove(&self, user: &UserId, kind: TermKind, raw: &str) -> CommandReply {
        let Some(term) = normalize_term(raw) else {
            return invalid_term(kind);
        };

        let result = match kind {
            TermKind::Keyword => self.store.remove_keyword(user, &term).await,
            TermKind::ForbiddenWord => self.store.remove_forbidden_word(user, &term).await,
        };

        match result {
            Ok(RemoveOutcome::Removed) => CommandReply::new(
                CommandOutcome::Removed,
                format!("Removed **{}** from your {}.", term, kind.label()),
            ),
            Ok(RemoveOutcome::NotFound) => CommandReply::new(
                CommandOutcome::NotFound,
                format!("Couldn't find **{}** in your {}.", term, kind.label()),
            ),
            Err(e) => {
                tracing::error!(user_id = %user, term = %term, operation = "remove", error = %e, "Command failed");
                CommandReply::internal_failure(kind)
            }
        }
    }

    async fn list(&self, user: &UserId, kind: TermKind) -> CommandReply {
        let result = match kind {
            TermKind::Keyword => self.store.keywords_of(user).await,
            TermKind::ForbiddenWord => self.store.forbidden_words_of(user).await,
        };

        match result {
            Ok(terms) if terms.is_empty() => CommandReply::new(
                CommandOutcome::Listed,
                format!("You have no {} yet.", kind.label()),
            ),
            Ok(terms) => CommandReply::new(
                CommandOutcome::Listed,
                format!(
                    "Your {} are **{}**.",
                    kind.label(),
                    terms.into_iter().collect::<Vec<_>>().join(", ")
                ),
            ),
            Err(e) => {
                tracing::error!(user_id = %user, operation = "list", error = %e, "Command failed");
                CommandReply::internal_failure(kind)
            }
        }
    }
}

fn invalid_term(kind: TermKind) -> CommandReply {
    CommandReply::new(
        CommandOutcome::Invalid,
        format!("Please give a word or phrase for your {}.", kind.label()),
    )
}
