use crate::traits::Publisher;
use crate::types::{Message, PosterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct StatusRequest<'a> {
    status: &'a str,
    content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<&'a str>,
}

/// Posts statuses through the Mastodon REST API (`POST /api/v1/statuses`).
pub struct MastodonPublisher {
    client: Client,
}

impl MastodonPublisher {
    pub fn new(user_agent: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }

    fn statuses_url(server: &str) -> String {
        format!("{}/api/v1/statuses", server.trim_end_matches('/'))
    }
}

/// MIME type for a feed's configured format. Unknown formats pass through untouched.
pub fn content_type(format: &str) -> String {
    match format {
        "" | "plain" => "text/plain".to_string(),
        "markdown" => "text/markdown".to_string(),
        "html" => "text/html".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Publisher for MastodonPublisher {
    async fn post(&self, message: &Message<'_>) -> Result<()> {
        let account = message.account;
        let body = StatusRequest {
            status: &message.content,
            content_type: content_type(&message.feed.format),
            visibility: account.visibility.as_deref(),
        };

        debug!("Posting to {} as [{}]: {:?}", account.server, account.name, body);

        let publish_error = |detail: String| PosterError::Publish {
            account: account.name.clone(),
            content: message.content.clone(),
            message: detail,
        };

        let response = self
            .client
            .post(Self::statuses_url(&account.server))
            .bearer_auth(&account.access_token)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| publish_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(text);
            return Err(publish_error(format!("HTTP {}: {}", status, detail)));
        }

        info!("Posted status for account [{}] from {}", account.name, message.feed.url);
        Ok(())
    }
}
