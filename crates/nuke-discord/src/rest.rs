//! Discord REST client for channel history
//!
//! Talks to the REST API directly so that HTTP 429 responses reach the
//! delete loop as [`PlatformError::RateLimited`] with the server's
//! `retry_after`, instead of being retried out of sight.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use nuke_core::{ChannelId, MessageGateway, MessageId, MessageSummary, PlatformError};

use crate::error::Result;

/// Used when a 429 carries no usable retry hint
const FALLBACK_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Longest wait honoured from a retry hint
const MAX_RETRY_AFTER: Duration = Duration::from_secs(600);

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
    #[serde(default)]
    global: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Discord REST API client
#[derive(Clone)]
pub struct DiscordRestClient {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl DiscordRestClient {
    /// Create a client for the given API root
    pub fn with_base_url(bot_token: &str, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Add authorization header
    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bot {}", self.bot_token))
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() {
        return FALLBACK_RETRY_AFTER;
    }
    Duration::try_from_secs_f64(seconds.min(MAX_RETRY_AFTER.as_secs_f64()))
        .unwrap_or(FALLBACK_RETRY_AFTER)
}

/// Turn a non-success response into a platform error
async fn error_from_response(response: Response) -> PlatformError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let header_hint = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok());
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<RateLimitBody>(&body).ok();

        let retry_after = parsed
            .as_ref()
            .map(|b| b.retry_after)
            .or(header_hint)
            .map_or(FALLBACK_RETRY_AFTER, seconds_to_duration);

        return PlatformError::RateLimited {
            retry_after,
            global: parsed.is_some_and(|b| b.global),
        };
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    match status {
        StatusCode::FORBIDDEN => PlatformError::Forbidden(message),
        StatusCode::NOT_FOUND => PlatformError::NotFound(message),
        _ => PlatformError::Request(format!("{}: {}", status, message)),
    }
}

#[async_trait]
impl MessageGateway for DiscordRestClient {
    async fn messages_before(
        &self,
        channel_id: ChannelId,
        before: Option<MessageId>,
        limit: u8,
    ) -> std::result::Result<Vec<MessageSummary>, PlatformError> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);

        let mut params = vec![("limit", limit.to_string())];
        if let Some(before) = before {
            params.push(("before", before.to_string()));
        }

        debug!("Fetching messages in channel {} before {:?}", channel_id, before);

        let response = self
            .add_auth(self.client.get(&url).query(&params))
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let raw: Vec<RawMessage> = response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))?;

        raw.into_iter()
            .map(|m| {
                let id = m
                    .id
                    .parse::<u64>()
                    .map_err(|e| PlatformError::Decode(format!("message id '{}': {}", m.id, e)))?;
                Ok(MessageSummary::new(id, m.timestamp))
            })
            .collect()
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> std::result::Result<(), PlatformError> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.base_url, channel_id, message_id
        );

        let response = self
            .add_auth(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}
