//! keyword-watch adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `store`: SQLite ledger/subscription store, plus an in-memory one for tests
//! - `reddit`: Reddit listing post source
//! - `discord`: Discord message sink and user directory
//! - `outbox`: JSONL outbox sink for reviewing alerts offline
//! - `stub`: Dry-run adapters

pub mod discord;
pub mod outbox;
pub mod reddit;
#[cfg(test)]
mod store_memory;
mod store_sqlite;
pub mod stub;

/// Re-exports for store adapters
pub mod store {
    #[cfg(test)]
    pub use crate::store_memory::InMemoryStore;
    pub use crate::store_sqlite::SqliteStore;
}
