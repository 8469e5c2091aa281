use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::slack::SlackWebhookClient;
use crate::template::MessageTemplate;
use crate::types::{InboundPayload, SlackMessage};

/// Where incoming payloads go when debug output is on.
pub trait DebugSink: Send + Sync {
    fn emit(&self, payload: &str);
}

pub struct Stdout;

impl DebugSink for Stdout {
    fn emit(&self, payload: &str) {
        println!("{}", payload);
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<RelayConfig>,
    template: Arc<MessageTemplate>,
    slack: Arc<SlackWebhookClient>,
    debug_sink: Arc<dyn DebugSink>,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        template: MessageTemplate,
        slack: SlackWebhookClient,
        debug_sink: Arc<dyn DebugSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            template: Arc::new(template),
            slack: Arc::new(slack),
            debug_sink,
        }
    }
}

/// Every path and method goes to the relay. Bodies are not size-capped.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(relay_handler)
        .layer(DefaultBodyLimit::disable())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn relay_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, RelayError> {
    info!("Received webhook, body length: {} bytes", body.len());

    let payload: InboundPayload = serde_json::from_slice(&body).map_err(RelayError::Decode)?;

    let text = state.template.render(&payload).map_err(RelayError::Render)?;

    if state.config.debug {
        match serde_json::to_string_pretty(&payload) {
            Ok(pretty) => state.debug_sink.emit(&pretty),
            Err(e) => warn!("Failed to format payload for debug output: {}", e),
        }
    }

    let message = SlackMessage::new(text, &state.config);
    let status = state.slack.post_message(&message).await?;

    // Slack's status never reaches the caller, only transport failures do
    if status.is_success() {
        info!("Relayed message to Slack ({})", status);
    } else {
        warn!("Slack answered {}, reporting success anyway", status);
    }

    Ok(StatusCode::OK)
}
