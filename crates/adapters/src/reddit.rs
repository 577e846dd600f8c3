//! Reddit listing adapter for fetching new posts

use async_trait::async_trait;
use keyword_watch_domain::{FeedSelector, FetchError, Post, PostSource, text::extract_first_link};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Settings for the Reddit listing client
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Posts requested per listing call
    pub limit: u32,
    pub timeout: Duration,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: concat!("keyword-watch/", env!("CARGO_PKG_VERSION")).to_string(),
            limit: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Post source reading the `new` listing of one or more subreddits
pub struct RedditPostSource {
    client: Client,
    config: RedditConfig,
}

impl RedditPostSource {
    pub fn new(config: RedditConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: Submission,
}

#[derive(Deserialize)]
struct Submission {
    id: String,
    title: String,
    subreddit: String,
    #[serde(default)]
    selftext_html: Option<String>,
}

impl From<Submission> for Post {
    fn from(submission: Submission) -> Self {
        let aux_link = submission
            .selftext_html
            .as_deref()
            .and_then(extract_first_link);

        Post {
            url: format!("https://redd.it/{}", submission.id),
            id: submission.id,
            title: submission.title,
            feed: submission.subreddit,
            aux_link,
        }
    }
}

#[async_trait]
impl PostSource for RedditPostSource {
    async fn fetch_posts(&self, selector: &FeedSelector) -> Result<Vec<Post>, FetchError> {
        if selector.is_empty() {
            return Ok(vec![]);
        }

        let url = format!(
            "{}/r/{}/new.json",
            self.config.base_url.trim_end_matches('/'),
            selector.joined()
        );

        tracing::debug!(url = %url, "Fetching listing from Reddit");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("limit", self.config.limit.to_string()),
                ("raw_json", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(FetchError::RateLimited(retry_after));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(format!("{}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let listing: Listing =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| Post::from(child.data))
            .collect();

        tracing::info!(feeds = %selector.joined(), count = posts.len(), "Fetched posts");

        Ok(posts)
    }
}
