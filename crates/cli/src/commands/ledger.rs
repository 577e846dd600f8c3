//! Ledger command - inspect recently seen posts

use anyhow::{Context, Result};
use keyword_watch_domain::LedgerStore;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

use crate::args::{LedgerArgs, LedgerCommands};
use crate::commands::open_store;
use crate::config::AppConfig;

pub async fn execute(args: LedgerArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        LedgerCommands::List { limit, json } => {
            let store = open_store(&config).await?;
            let records = store
                .recent(limit)
                .await
                .context("Failed to read the seen-post ledger")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }

            if records.is_empty() {
                println!("No posts recorded yet.");
                return Ok(());
            }

            for record in records {
                let seen_at = record
                    .first_seen_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| record.first_seen_at.to_string());
                println!("{}  {:<10}  {}", seen_at, record.post_id, record.title);
            }
            Ok(())
        }
    }
}
