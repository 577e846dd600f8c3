//! Discord REST adapters for message delivery and user lookup

use async_trait::async_trait;
use keyword_watch_domain::{NotificationSink, NotifyError, PostSummary, UserDirectory, UserId};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

/// Mention syntax for a Discord user
pub fn mention(user: &UserId) -> String {
    format!("<@{}>", user)
}

/// Discord bot client used as both the notification sink and the user directory
pub struct DiscordClient {
    client: Client,
    bot_token: SecretString,
    base_url: String,
}

impl DiscordClient {
    pub fn new(bot_token: SecretString, timeout: Duration) -> Result<Self, NotifyError> {
        Self::with_base_url(bot_token, "https://discord.com/api/v10".to_string(), timeout)
    }

    pub fn with_base_url(
        bot_token: SecretString,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            bot_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.bot_token.expose_secret())
    }

    async fn post_message(&self, channel: &str, body: &CreateMessage<'_>) -> Result<(), NotifyError> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.authorization())
            .json(body)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response, NotifyError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(NotifyError::Auth(format!("Discord rejected the bot token ({})", response.status())))
        }
        StatusCode::TOO_MANY_REQUESTS => Err(NotifyError::RateLimited),
        status if !status.is_success() => {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Api(format!("{}: {}", status, body)))
        }
        _ => Ok(response),
    }
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed<'a>>,
}

#[derive(Serialize)]
struct Embed<'a> {
    title: &'a str,
    url: &'a str,
}

#[async_trait]
impl NotificationSink for DiscordClient {
    async fn send_text(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        self.post_message(
            channel,
            &CreateMessage {
                content: Some(text),
                embeds: vec![],
            },
        )
        .await
    }

    async fn send_summary(&self, channel: &str, summary: &PostSummary) -> Result<(), NotifyError> {
        self.post_message(
            channel,
            &CreateMessage {
                content: None,
                embeds: vec![Embed {
                    title: &summary.title,
                    url: &summary.url,
                }],
            },
        )
        .await
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[async_trait]
impl UserDirectory for DiscordClient {
    async fn resolve(&self, user: &UserId) -> Result<Option<String>, NotifyError> {
        let url = format!("{}/users/{}", self.base_url, user);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        check_status(response).await?;
        Ok(Some(mention(user)))
    }
}

/// Directory that formats every user as a mention without checking existence
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDirectory;

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn resolve(&self, user: &UserId) -> Result<Option<String>, NotifyError> {
        Ok(Some(mention(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> DiscordClient {
        DiscordClient::with_base_url(
            SecretString::new("test-token".into()),
            server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_text_posts_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/channels/829/messages"))
            .and(header("Authorization", "Bot test-token"))
            .and(body_json(serde_json::json!({ "content": "<@1>, <@2>" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "m1" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(&mock_server)
            .send_text("829", "<@1>, <@2>")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_summary_posts_embed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/channels/829/messages"))
            .and(body_json(serde_json::json!({
                "embeds": [{ "title": "[GB] GMK Olivia", "url": "https://redd.it/abc" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "m2" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let summary = PostSummary {
            title: "[GB] GMK Olivia".to_string(),
            url: "https://redd.it/abc".to_string(),
        };
        client(&mock_server).send_summary("829", &summary).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_errors_are_classified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/channels/401/messages"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/channels/429/messages"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let discord = client(&mock_server);
        assert!(matches!(
            discord.send_text("401", "hi").await,
            Err(NotifyError::Auth(_))
        ));
        assert!(matches!(
            discord.send_text("429", "hi").await,
            Err(NotifyError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/111"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "111",
                "username": "keeb"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/222"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/333"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let discord = client(&mock_server);
        assert_eq!(
            discord.resolve(&UserId::new("111")).await.unwrap(),
            Some("<@111>".to_string())
        );
        assert_eq!(discord.resolve(&UserId::new("222")).await.unwrap(), None);
        assert!(matches!(
            discord.resolve(&UserId::new("333")).await,
            Err(NotifyError::Api(_))
        ));
    }
}
