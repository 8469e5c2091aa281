use clap::Parser;
use std::time::Duration;

/// Missing link between Jira and Slack integration.
///
/// Listens for Jira webhooks, renders a message from each incoming JSON
/// body and posts it to a Slack incoming webhook.
#[derive(Debug, Parser)]
#[command(name = "jira-to-slack", version)]
pub struct Cli {
    /// Slack incoming-webhook URL
    #[arg(value_name = "SLACK_URL", env = "SLACK_WEBHOOK_URL")]
    pub slack_url: String,

    /// Listen to specified address (`:8080` listens on all interfaces)
    #[arg(short = 'L', long = "listen", value_name = "ADDRESS", env = "LISTEN_ADDR")]
    pub listen: String,

    /// Template which will be rendered from incoming JSON and sent to Slack
    #[arg(
        short = 't',
        long = "template",
        value_name = "TEXT_TEMPLATE",
        env = "MESSAGE_TEMPLATE"
    )]
    pub template: String,

    /// Emoji to use as icon
    #[arg(short = 'e', long = "emoji", env = "SLACK_ICON_EMOJI")]
    pub emoji: Option<String>,

    /// Channel to send to
    #[arg(short = 'c', long = "channel", env = "SLACK_CHANNEL")]
    pub channel: Option<String>,

    /// Username to show
    #[arg(short = 'u', long = "username", env = "SLACK_USERNAME")]
    pub username: Option<String>,

    /// Show incoming JSON from Jira on stdout
    #[arg(short = 'v', long = "verbose", env = "DEBUG_PAYLOADS")]
    pub verbose: bool,

    /// Give up on a Slack request after this many seconds (no limit by default)
    #[arg(long, value_name = "SECONDS", env = "SLACK_TIMEOUT_SECS")]
    pub timeout: Option<u64>,
}

/// Per-process relay settings, read-only once the server starts.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub webhook_url: String,
    pub channel: Option<String>,
    pub icon_emoji: Option<String>,
    pub username: Option<String>,
    pub debug: bool,
}

impl Cli {
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            webhook_url: self.slack_url.clone(),
            channel: self.channel.clone(),
            icon_emoji: self.emoji.clone(),
            username: self.username.clone(),
            debug: self.verbose,
        }
    }

    pub fn listen_addr(&self) -> String {
        normalize_listen_addr(&self.listen)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

// Go-style ":8080" has no host part
fn normalize_listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}
