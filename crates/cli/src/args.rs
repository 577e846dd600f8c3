//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// keyword-watch: alert Discord users when new subreddit posts match their keywords
#[derive(Parser, Debug)]
#[command(name = "keyword-watch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the configured feeds and send keyword alerts
    Run(RunArgs),

    /// Manage a user's keywords
    Keywords(TermArgs),

    /// Manage a user's forbidden words
    Forbidden(TermArgs),

    /// Handle a chat command message such as `!ak gmk olivia` on behalf of a user
    #[command(name = "command")]
    ChatCommand(MessageArgs),

    /// Manage registered users
    Users(UsersArgs),

    /// Inspect the seen-post ledger
    Ledger(LedgerArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run in dry-run mode (log alerts instead of sending them)
    #[arg(long)]
    pub dry_run: bool,

    /// Process one poll cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Write alerts to this JSONL file for review instead of sending them
    #[arg(long)]
    pub outbox: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TermArgs {
    #[command(subcommand)]
    pub command: TermCommands,
}

#[derive(Subcommand, Debug)]
pub enum TermCommands {
    /// Add a word or phrase
    Add {
        /// Discord user ID
        #[arg(long)]
        user: String,

        /// Words of the term, joined with single spaces
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },

    /// Remove a word or phrase
    Remove {
        /// Discord user ID
        #[arg(long)]
        user: String,

        /// Words of the term, joined with single spaces
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },

    /// List the user's terms
    List {
        /// Discord user ID
        #[arg(long)]
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Discord user ID of the sender
    #[arg(long)]
    pub user: String,

    /// Message text, joined with single spaces
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub message: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommands,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// Register a user without subscribing to anything
    Register {
        /// Discord user ID
        #[arg(long)]
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommands,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommands {
    /// List the most recently seen posts
    List {
        /// Maximum number of entries
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
