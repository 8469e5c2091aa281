use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::slack::SlackError;
use crate::template::TemplateError;

/// Why a single relayed request failed. The caller only ever sees the status.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("error while decoding JSON from webhook: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("error while executing template: {0}")]
    Render(#[source] TemplateError),

    #[error("error while encoding request for Slack: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("error while performing request to Slack: {0}")]
    Delivery(#[source] reqwest::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Decode(_) => StatusCode::BAD_REQUEST,
            RelayError::Render(_) | RelayError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<SlackError> for RelayError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::Encode(e) => RelayError::Encode(e),
            SlackError::Transport(e) => RelayError::Delivery(e),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!(status = %status, "{}", self);
        } else {
            error!(status = %status, "{}", self);
        }
        status.into_response()
    }
}
