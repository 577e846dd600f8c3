//! Ingestion loop use case - fetches, deduplicates, matches and notifies

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    model::{
        CyclePhase, CycleReport, FeedSelector, MarkSeen, OutboundMessage, Post, PostOutcome,
        UserId, UserResolution,
    },
    ports::{Clock, LedgerStore, NotificationSink, PostSource, SubscriptionStore, UserDirectory},
    usecases::{
        matcher::Matcher,
        render::{RenderConfig, Renderer},
        scheduler::{Scheduler, Shutdown},
    },
};

/// Configuration for the ingestion loop
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Sub-feeds fetched every cycle
    pub feeds: Vec<String>,
    /// Sub-feeds whose new posts are matched and announced
    pub alert_feeds: Vec<String>,
    /// Channel receiving the alert messages
    pub alert_channel: String,
    /// Render config
    pub render_config: RenderConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            feeds: vec![
                "MechMarket".to_string(),
                "MechGroupBuys".to_string(),
                "MechanicalKeyboards".to_string(),
            ],
            alert_feeds: vec!["MechMarket".to_string()],
            alert_channel: String::new(),
            render_config: RenderConfig::default(),
        }
    }
}

/// Ingestion loop orchestrator
pub struct IngestionLoop<S, L, Sub, N, D, Cl>
where
    S: PostSource + ?Sized,
    L: LedgerStore + ?Sized,
    Sub: SubscriptionStore + ?Sized,
    N: NotificationSink + ?Sized,
    D: UserDirectory + ?Sized,
    Cl: Clock + ?Sized,
{
    post_source: Arc<S>,
    ledger: Arc<L>,
    subscriptions: Arc<Sub>,
    sink: Arc<N>,
    directory: Arc<D>,
    clock: Arc<Cl>,
    config: IngestConfig,
    selector: FeedSelector,
    renderer: Renderer,
}

impl<S, L, Sub, N, D, Cl> IngestionLoop<S, L, Sub, N, D, Cl>
where
    S: PostSource + ?Sized,
    L: LedgerStore + ?Sized,
    Sub: SubscriptionStore + ?Sized,
    N: NotificationSink + ?Sized,
    D: UserDirectory + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        post_source: Arc<S>,
        ledger: Arc<L>,
        subscriptions: Arc<Sub>,
        sink: Arc<N>,
        directory: Arc<D>,
        clock: Arc<Cl>,
        config: IngestConfig,
    ) -> Self {
        let selector = FeedSelector::new(config.feeds.iter().cloned());
        let renderer = Renderer::new(config.render_config.clone());
        Self {
            post_source,
            ledger,
            subscriptions,
            sink,
            directory,
            clock,
            config,
            selector,
            renderer,
        }
    }

    /// Run cycles on the scheduler's cadence until shutdown
    pub async fn run(&self, scheduler: &Scheduler, shutdown: &Shutdown) -> u64 {
        scheduler
            .run(shutdown, move || async move {
                match self.run_cycle(shutdown).await {
                    Ok(report) => {
                        tracing::info!(
                            fetched = report.fetched,
                            new_posts = report.new_posts(),
                            notified = report.notified(),
                            failed = report.failed(),
                            "Cycle complete"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Cycle ended early");
                    }
                }
                self.enter(CyclePhase::Idle);
            })
            .await
    }

    /// Run a single fetch/dedup/match/notify cycle
    pub async fn run_cycle(&self, shutdown: &Shutdown) -> Result<CycleReport, CycleError> {
        self.enter(CyclePhase::Fetching);
        tracing::info!(feeds = %self.selector.joined(), "Checking for new posts");

        let posts = self
            .post_source
            .fetch_posts(&self.selector)
            .await
            .map_err(|e| CycleError::Fetch(e.to_string()))?;

        let mut report = CycleReport {
            fetched: posts.len(),
            ..Default::default()
        };

        for post in posts {
            if shutdown.is_requested() {
                tracing::info!(
                    remaining_from = %post.id,
                    "Shutdown requested, leaving remaining posts for the next run"
                );
                report.interrupted = true;
                break;
            }

            let outcome = self.process_post(&post).await;
            if let PostOutcome::Failed { error } = &outcome {
                tracing::error!(post_id = %post.id, error = %error, "Failed to process post");
            }
            report.outcomes.push((post.id, outcome));
        }

        Ok(report)
    }

    /// Dedup, record, then match and notify one post
    async fn process_post(&self, post: &Post) -> PostOutcome {
        self.enter(CyclePhase::Deduplicating);

        match self.ledger.has_seen(&post.id).await {
            Ok(true) => return PostOutcome::AlreadySeen,
            Ok(false) => {}
            Err(e) => {
                return PostOutcome::Failed {
                    error: format!("Ledger lookup failed: {}", e),
                };
            }
        }

        // Recorded before any notification: a failed send never causes a resend
        match self
            .ledger
            .mark_seen(&post.id, &post.title, self.clock.now())
            .await
        {
            Ok(MarkSeen::Recorded) => {}
            Ok(MarkSeen::AlreadyRecorded) => {
                tracing::debug!(post_id = %post.id, "Post recorded concurrently, skipping");
                return PostOutcome::AlreadySeen;
            }
            Err(e) => {
                return PostOutcome::Failed {
                    error: format!("Ledger write failed: {}", e),
                };
            }
        }

        tracing::info!(
            post_id = %post.id,
            feed = %post.feed,
            title = %crate::text::truncate_chars(&post.title, 20),
            "Found new post"
        );

        if !self.is_alert_feed(&post.feed) {
            return PostOutcome::Recorded;
        }

        self.enter(CyclePhase::Matching);
        let matched = match Matcher::new(self.subscriptions.as_ref())
            .match_post(post)
            .await
        {
            Ok(matched) => matched,
            Err(e) => {
                return PostOutcome::Failed {
                    error: format!("Matching failed: {}", e),
                };
            }
        };

        let (mentioned, mentions) = self.resolve_mentions(post, matched).await;

        self.enter(CyclePhase::Notifying);
        let delivery_failures = self.deliver(post, &mentions).await;

        PostOutcome::Notified {
            mentioned,
            delivery_failures,
        }
    }

    /// Resolve matched users to mention text, dropping unresolvable ones
    async fn resolve_mentions(
        &self,
        post: &Post,
        matched: BTreeSet<UserId>,
    ) -> (Vec<UserId>, Vec<String>) {
        let mut mentioned = Vec::new();
        let mut mentions = Vec::new();

        for user in matched {
            let resolution = match self.directory.resolve(&user).await {
                Ok(Some(mention)) => UserResolution::Found(mention),
                Ok(None) => UserResolution::NotFound,
                Err(e) => UserResolution::Failed(e.to_string()),
            };

            match resolution {
                UserResolution::Found(mention) => {
                    mentioned.push(user);
                    mentions.push(mention);
                }
                UserResolution::NotFound => {
                    tracing::warn!(post_id = %post.id, user_id = %user, "Matched user not found, skipping mention");
                }
                UserResolution::Failed(error) => {
                    tracing::warn!(
                        post_id = %post.id,
                        user_id = %user,
                        error = %error,
                        "Failed to resolve matched user, skipping mention"
                    );
                }
            }
        }

        (mentioned, mentions)
    }

    /// Send the rendered messages in order; returns how many failed
    async fn deliver(&self, post: &Post, mentions: &[String]) -> usize {
        let channel = self.config.alert_channel.as_str();
        let mut failures = 0;

        for message in self.renderer.render(post, mentions) {
            let result = match &message {
                OutboundMessage::Mentions(text) | OutboundMessage::AuxLink(text) => {
                    self.sink.send_text(channel, text).await
                }
                OutboundMessage::Summary(summary) => self.sink.send_summary(channel, summary).await,
            };

            if let Err(e) = result {
                failures += 1;
                tracing::error!(
                    post_id = %post.id,
                    message = message.kind(),
                    sink = self.sink.name(),
                    error = %e,
                    "Failed to deliver message"
                );
            }
        }

        failures
    }

    fn is_alert_feed(&self, feed: &str) -> bool {
        self.config
            .alert_feeds
            .iter()
            .any(|f| f.eq_ignore_ascii_case(feed))
    }

    fn enter(&self, phase: CyclePhase) {
        tracing::trace!(phase = %phase, "Cycle phase");
    }
}

/// Errors that end a cycle early
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Post source error: {0}")]
    Fetch(String),
}
