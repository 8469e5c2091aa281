mod config;
mod error;
mod relay;
mod server;
mod slack;
mod template;
mod types;

use clap::Parser;
use config::Cli;
use relay::{AppState, Stdout};
use server::RelayServer;
use slack::SlackWebhookClient;
use std::sync::Arc;
use template::MessageTemplate;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load environment variables (CLI arguments fall back to them)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jira_to_slack=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // A template that does not compile would fail every request
    let template = match MessageTemplate::compile(&cli.template) {
        Ok(template) => template,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let config = cli.relay_config();
    if config.debug {
        warn!("Verbose mode enabled - incoming JSON will be printed to stdout");
    }
    info!(
        channel = config.channel.as_deref().unwrap_or("<webhook default>"),
        "Relaying to Slack webhook"
    );

    let slack = SlackWebhookClient::new(config.webhook_url.clone(), cli.timeout());
    let state = AppState::new(config, template, slack, Arc::new(Stdout));

    let addr = cli.listen_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = RelayServer::new(state).serve(listener).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
