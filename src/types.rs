use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::RelayConfig;

/// Incoming webhook body. No schema: the template decides which fields matter.
pub type InboundPayload = Map<String, Value>;

/// Body posted to the Slack incoming webhook.
#[derive(Debug, Serialize)]
pub struct SlackMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl SlackMessage {
    /// Builds the outbound message, copying only the overrides that are configured.
    pub fn new(text: String, config: &RelayConfig) -> Self {
        Self {
            text,
            channel: config.channel.clone(),
            icon_emoji: config.icon_emoji.clone(),
            username: config.username.clone(),
        }
    }
}
