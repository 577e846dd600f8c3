//! Rendering use case - turns a matched post into its outbound messages

use crate::{
    MESSAGE_MAX_CHARS, SUMMARY_TITLE_MAX_CHARS,
    model::{OutboundMessage, Post, PostSummary},
    text::truncate_chars,
};

/// Configuration for the renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum title characters in the summary message
    pub summary_title_max_chars: usize,
    /// Separator placed between mentions
    pub mention_separator: String,
    /// Mentions are split across messages of at most this many characters
    pub max_message_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            summary_title_max_chars: SUMMARY_TITLE_MAX_CHARS,
            mention_separator: ", ".to_string(),
            max_message_chars: MESSAGE_MAX_CHARS,
        }
    }
}

/// Renderer for alert-channel messages
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Messages for one post in send order: mentions, summary, auxiliary link
    pub fn render(&self, post: &Post, mentions: &[String]) -> Vec<OutboundMessage> {
        let mut messages: Vec<OutboundMessage> = self
            .mention_chunks(mentions)
            .into_iter()
            .map(OutboundMessage::Mentions)
            .collect();

        messages.push(OutboundMessage::Summary(self.summarize(post)));

        if let Some(link) = post.aux_link.as_deref().filter(|l| !l.trim().is_empty()) {
            messages.push(OutboundMessage::AuxLink(link.to_string()));
        }

        messages
    }

    /// Join mentions greedily into as few messages as fit the size limit.
    ///
    /// A mention is never split; one longer than the limit gets a message of its own.
    fn mention_chunks(&self, mentions: &[String]) -> Vec<String> {
        let separator = &self.config.mention_separator;
        let separator_len = separator.chars().count();
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for mention in mentions {
            let len = mention.chars().count();
            if current_len > 0 && current_len + separator_len + len > self.config.max_message_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push_str(separator);
                current_len += separator_len;
            }
            current.push_str(mention);
            current_len += len;
        }

        if current_len > 0 {
            chunks.push(current);
        }
        chunks
    }

    pub fn summarize(&self, post: &Post) -> PostSummary {
        PostSummary {
            title: truncate_chars(&post.title, self.config.summary_title_max_chars).to_string(),
            url: post.url.clone(),
        }
    }
}
