pub mod config;
pub mod keywords;
pub mod ledger;
pub mod run;
pub mod users;

use anyhow::{Context, Result};
use keyword_watch_adapters::store::SqliteStore;

use crate::config::AppConfig;

/// Open the configured state database
pub(crate) async fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    SqliteStore::new(&config.general.state_db_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open state database: {}",
                config.general.state_db_path.display()
            )
        })
}
