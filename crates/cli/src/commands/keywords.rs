//! Keywords, forbidden words and chat commands - per-user term management

use anyhow::{Result, bail};
use keyword_watch_domain::{
    UserId,
    usecases::{Command, CommandOutcome, CommandReply, SubscriptionCommands, TermKind},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::{MessageArgs, TermArgs, TermCommands};
use crate::commands::open_store;
use crate::config::AppConfig;

pub async fn execute(args: TermArgs, kind: TermKind, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = Arc::new(open_store(&config).await?);
    let commands = SubscriptionCommands::new(store);

    let (user, command) = to_command(args.command, kind)?;
    let reply = commands.handle(&user, command).await;
    print_reply(reply)
}

/// Parse a chat message with the `!` command grammar and apply it
pub async fn execute_message(args: MessageArgs, config_path: Option<PathBuf>) -> Result<()> {
    let message = args.message.join(" ");
    let Some(command) = Command::parse(&message) else {
        bail!("Not a recognized command: {}", message);
    };

    let user = parse_user(args.user)?;
    let config = AppConfig::load(config_path.as_deref())?;
    let store = Arc::new(open_store(&config).await?);
    let commands = SubscriptionCommands::new(store);

    tracing::debug!(user = %user, command = ?command, "Handling chat command");
    let reply = commands.handle(&user, command).await;
    print_reply(reply)
}

fn print_reply(reply: CommandReply) -> Result<()> {
    match reply.outcome {
        CommandOutcome::Invalid | CommandOutcome::InternalFailure => bail!("{}", reply.text),
        _ => {
            println!("{}", reply.text);
            Ok(())
        }
    }
}

fn to_command(command: TermCommands, kind: TermKind) -> Result<(UserId, Command)> {
    let (user, command) = match command {
        TermCommands::Add { user, term } => (user, Command::Add(kind, term.join(" "))),
        TermCommands::Remove { user, term } => (user, Command::Remove(kind, term.join(" "))),
        TermCommands::List { user } => (user, Command::List(kind)),
    };

    Ok((parse_user(user)?, command))
}

fn parse_user(raw: String) -> Result<UserId> {
    let user = UserId::new(raw);
    if user.as_str().is_empty() {
        bail!("User ID must not be empty");
    }
    Ok(user)
}
