//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub reddit: RedditSettings,

    #[serde(default)]
    pub discord: DiscordSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_db_path")]
    pub state_db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_true")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    #[serde(default = "default_alert_feeds")]
    pub alert_feeds: Vec<String>,

    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditSettings {
    #[serde(default = "default_reddit_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordSettings {
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    #[serde(default = "default_discord_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub alert_channel_id: String,

    #[serde(default)]
    pub status_channel_id: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_state_db_path() -> PathBuf {
    PathBuf::from("./keyword-watch.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    90
}

fn default_feeds() -> Vec<String> {
    vec![
        "MechMarket".to_string(),
        "MechGroupBuys".to_string(),
        "MechanicalKeyboards".to_string(),
    ]
}

fn default_alert_feeds() -> Vec<String> {
    vec!["MechMarket".to_string()]
}

fn default_fetch_limit() -> u32 {
    100
}

fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_user_agent() -> String {
    concat!("keyword-watch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_bot_token_env() -> String {
    "DISCORD_BOT_TOKEN".to_string()
}

fn default_discord_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_db_path: default_state_db_path(),
            log_level: default_log_level(),
            dry_run: default_true(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            feeds: default_feeds(),
            alert_feeds: default_alert_feeds(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            base_url: default_reddit_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            bot_token_env: default_bot_token_env(),
            base_url: default_discord_base_url(),
            alert_channel_id: String::new(),
            status_channel_id: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Reject settings the poll loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            anyhow::bail!("No feeds configured in watch.feeds");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("watch.poll_interval_secs must be at least 1");
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("KEYWORD_WATCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# keyword-watch configuration

[general]
state_db_path = "./keyword-watch.sqlite"
log_level = "info"
# Log alerts instead of sending them
dry_run = true

[watch]
# Pause between the end of one cycle and the start of the next
poll_interval_secs = 90
# Every feed is fetched and recorded in the ledger
feeds = ["MechMarket", "MechGroupBuys", "MechanicalKeyboards"]
# Only new posts from these feeds are matched and announced
alert_feeds = ["MechMarket"]
fetch_limit = 100

[reddit]
base_url = "https://www.reddit.com"
user_agent = "keyword-watch/0.1"
timeout_secs = 30

[discord]
bot_token_env = "DISCORD_BOT_TOKEN"
base_url = "https://discord.com/api/v10"
alert_channel_id = "000000000000000000"
# status_channel_id = "000000000000000000"
timeout_secs = 30
"#
        .to_string()
    }
}
