use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::types::SlackMessage;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("failed to encode Slack message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("request to Slack failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Posts messages to a single Slack incoming-webhook URL.
pub struct SlackWebhookClient {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackWebhookClient {
    pub fn new(webhook_url: String, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            webhook_url,
            client: builder.build().unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Sends one message. Only transport failures are errors: whatever status
    /// Slack answers with is handed back, and the response body is never read.
    pub async fn post_message(&self, message: &SlackMessage) -> Result<StatusCode, SlackError> {
        let body = serde_json::to_vec(message).map_err(SlackError::Encode)?;

        let response = self
            .client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(SlackError::Transport)?;

        Ok(response.status())
    }
}
