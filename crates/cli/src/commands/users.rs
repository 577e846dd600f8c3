//! Users command - registration of users joining the server

use anyhow::{Context, Result, bail};
use keyword_watch_domain::{UserId, usecases::SubscriptionCommands};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::{UsersArgs, UsersCommands};
use crate::commands::open_store;
use crate::config::AppConfig;

pub async fn execute(args: UsersArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        UsersCommands::Register { user } => {
            let user = UserId::new(user);
            if user.as_str().is_empty() {
                bail!("User ID must not be empty");
            }

            let commands = SubscriptionCommands::new(Arc::new(open_store(&config).await?));
            commands
                .register_user(&user)
                .await
                .with_context(|| format!("Failed to register user {}", user))?;

            println!("Registered user {}", user);
            Ok(())
        }
    }
}
