//! Application use cases / business logic

pub mod commands;
pub mod ingest;
pub mod matcher;
pub mod render;
pub mod scheduler;

pub use commands::{Command, CommandOutcome, CommandReply, SubscriptionCommands, TermKind};
pub use ingest::{CycleError, IngestConfig, IngestionLoop};
pub use matcher::Matcher;
pub use render::{RenderConfig, Renderer};
pub use scheduler::{Scheduler, Shutdown, ShutdownTrigger, shutdown_channel};
