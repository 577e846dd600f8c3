//! keyword-watch CLI entry point

use anyhow::Result;
use clap::Parser;
use keyword_watch_domain::usecases::TermKind;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flag first, then the config file
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| {
            AppConfig::load(cli.config.as_deref())
                .ok()
                .map(|config| config.general.log_level)
        })
        .unwrap_or_else(|| "info".to_string());
    init_logging(&log_level)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.config).await,
        Commands::Keywords(args) => {
            commands::keywords::execute(args, TermKind::Keyword, cli.config).await
        }
        Commands::Forbidden(args) => {
            commands::keywords::execute(args, TermKind::ForbiddenWord, cli.config).await
        }
        Commands::ChatCommand(args) => commands::keywords::execute_message(args, cli.config).await,
        Commands::Users(args) => commands::users::execute(args, cli.config).await,
        Commands::Ledger(args) => commands::ledger::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
