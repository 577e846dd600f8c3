//! keyword-watch domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `text`: Term normalization, truncation and link extraction
//! - `usecases`: Matching, ingestion cycles, scheduling and subscription commands

pub mod model;
pub mod ports;
pub mod text;
pub mod usecases;

pub use model::*;
pub use ports::*;

/// Maximum characters of a title kept in the seen-post ledger.
///
/// Only the stored copy is truncated; matching always uses the full title.
pub const SEEN_TITLE_MAX_CHARS: usize = 100;

/// Maximum characters of a title in the structured post summary
pub const SUMMARY_TITLE_MAX_CHARS: usize = 200;

/// Discord's limit on the content of a single message
pub const MESSAGE_MAX_CHARS: usize = 2000;
