//! Run command - poll, match and alert loop

use anyhow::{Context, Result, bail};
use keyword_watch_adapters::{
    discord::{DiscordClient, StaticDirectory},
    outbox::OutboxSink,
    reddit::{RedditConfig, RedditPostSource},
    stub::LogSink,
};
use keyword_watch_domain::{
    NotificationSink, PostOutcome, SystemClock, UserDirectory,
    usecases::{
        IngestConfig, IngestionLoop, RenderConfig, Scheduler, Shutdown, shutdown_channel,
    },
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::RunArgs;
use crate::commands::open_store;
use crate::config::AppConfig;

const READY_MESSAGE: &str = "keyword-watch is online and watching for new posts.";

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let mut dry_run = args.dry_run || config.general.dry_run;
    if args.outbox.is_some() && dry_run {
        tracing::info!("--outbox overrides dry-run");
        dry_run = false;
    }

    tracing::info!(
        dry_run = dry_run,
        once = args.once,
        outbox = ?args.outbox,
        feeds = ?config.watch.feeds,
        alert_feeds = ?config.watch.alert_feeds,
        "Starting keyword-watch run"
    );

    config.watch.validate()?;

    let store = Arc::new(open_store(&config).await?);
    let post_source = Arc::new(build_post_source(&config)?);
    let (sink, directory) = build_delivery(&config, dry_run, args.outbox.clone()).await?;

    announce_ready(&config, sink.as_ref()).await;

    let ingest = IngestionLoop::new(
        post_source,
        store.clone(),
        store,
        sink,
        directory,
        Arc::new(SystemClock),
        IngestConfig {
            feeds: config.watch.feeds.clone(),
            alert_feeds: config.watch.alert_feeds.clone(),
            alert_channel: config.discord.alert_channel_id.clone(),
            render_config: RenderConfig::default(),
        },
    );

    if args.once {
        tracing::info!("Running single poll cycle");
        let report = ingest
            .run_cycle(&Shutdown::never())
            .await
            .context("Poll cycle failed")?;

        tracing::info!(
            fetched = report.fetched,
            new_posts = report.new_posts(),
            notified = report.notified(),
            failed = report.failed(),
            "Poll cycle complete"
        );

        for (post_id, outcome) in &report.outcomes {
            match outcome {
                PostOutcome::Notified {
                    mentioned,
                    delivery_failures,
                } => {
                    tracing::info!(
                        post_id = %post_id,
                        mentioned = mentioned.len(),
                        delivery_failures = *delivery_failures,
                        "Alerted"
                    );
                }
                PostOutcome::Failed { error } => {
                    tracing::error!(post_id = %post_id, error = %error, "Failed");
                }
                PostOutcome::Recorded | PostOutcome::AlreadySeen => {
                    tracing::debug!(post_id = %post_id, outcome = ?outcome, "Skipped");
                }
            }
        }
    } else {
        let (trigger, shutdown) = shutdown_channel();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    trigger.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                }
            }
        });

        let scheduler = Scheduler::new(config.watch.poll_interval());
        let cycles = ingest.run(&scheduler, &shutdown).await;
        tracing::info!(cycles = cycles, "Shutting down gracefully");
    }

    tracing::info!("keyword-watch run completed");
    Ok(())
}

fn build_post_source(config: &AppConfig) -> Result<RedditPostSource> {
    RedditPostSource::new(RedditConfig {
        base_url: config.reddit.base_url.clone(),
        user_agent: config.reddit.user_agent.clone(),
        limit: config.watch.fetch_limit,
        timeout: Duration::from_secs(config.reddit.timeout_secs),
    })
    .context("Failed to initialize Reddit client")
}

async fn build_delivery(
    config: &AppConfig,
    dry_run: bool,
    outbox: Option<PathBuf>,
) -> Result<(Arc<dyn NotificationSink>, Arc<dyn UserDirectory>)> {
    if let Some(path) = outbox {
        let sink = OutboxSink::new(path.clone())
            .await
            .context("Failed to initialize outbox")?;
        tracing::info!(outbox = %path.display(), "Writing alerts to outbox");
        let sink: Arc<dyn NotificationSink> = Arc::new(sink);
        let directory: Arc<dyn UserDirectory> = Arc::new(StaticDirectory);
        return Ok((sink, directory));
    }

    if dry_run {
        let sink: Arc<dyn NotificationSink> = Arc::new(LogSink);
        let directory: Arc<dyn UserDirectory> = Arc::new(StaticDirectory);
        return Ok((sink, directory));
    }

    if config.discord.alert_channel_id.trim().is_empty() {
        bail!("discord.alert_channel_id must be set unless running in dry-run mode");
    }

    let token = load_api_key(&config.discord.bot_token_env, "discord")?;
    let client = Arc::new(
        DiscordClient::with_base_url(
            token,
            config.discord.base_url.clone(),
            Duration::from_secs(config.discord.timeout_secs),
        )
        .context("Failed to initialize Discord client")?,
    );

    let sink: Arc<dyn NotificationSink> = client.clone();
    let directory: Arc<dyn UserDirectory> = client;
    Ok((sink, directory))
}

async fn announce_ready(config: &AppConfig, sink: &dyn NotificationSink) {
    let Some(channel) = config
        .discord
        .status_channel_id
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    else {
        return;
    };

    match sink.send_text(channel, READY_MESSAGE).await {
        Ok(()) => tracing::info!(channel = %channel, sink = sink.name(), "Sent ready notice"),
        Err(e) => tracing::warn!(channel = %channel, error = %e, "Failed to send ready notice"),
    }
}

fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No token env var configured for {}", provider);
    }

    let key = std::env::var(env_var)
        .with_context(|| format!("Missing token env var {} for {}", env_var, provider))?;

    if key.trim().is_empty() {
        bail!("Token env var {} is empty for {}", env_var, provider);
    }

    Ok(SecretString::new(key.into()))
}
