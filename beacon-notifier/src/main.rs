//! Beacon Notifier
//!
//! Receives build lifecycle events from the orchestrator and posts them as
//! chat messages.
//!
//! Architecture:
//! - Configuration: JSON file plus environment overrides, validated at startup
//! - Repositories: orchestrator lookups and chat delivery over HTTP
//! - Services: message composition, recipient resolution and dispatch
//! - API: axum endpoints the orchestrator posts events to

mod api;
mod config;
mod repository;
mod service;

use anyhow::{Context, Result};
use beacon_client::{ChatClient, OrchestratorClient};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{BuildDetailRepository, HttpBuildDetailRepository, HttpChatTransport};
use crate::service::NotificationDispatcher;

#[derive(Parser)]
#[command(name = "beacon-notifier")]
#[command(about = "Posts build notifications to chat", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, env = "BEACON_CONFIG")]
    config: PathBuf,

    /// Address the event API listens on
    #[arg(long, env = "BEACON_BIND_ADDR", default_value = "0.0.0.0:8090")]
    bind_addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_notifier=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Starting Beacon Notifier");

    // Load configuration
    let config = Config::from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?
        .with_env_overrides();
    config.validate().context("Invalid configuration")?;

    info!(
        "Loaded configuration: endpoint={}, variant={:?}, {} room route(s), {} user route(s)",
        config.endpoint,
        config.api_variant,
        config.builder_room_map.len(),
        config.builder_user_map.len()
    );

    let http = reqwest_client(&config)?;

    let chat = ChatClient::with_client(
        config.endpoint.clone(),
        config.api_variant,
        config.auth_token.clone(),
        http.clone(),
    );
    let transport = Arc::new(HttpChatTransport::new(chat));

    let details = match &config.orchestrator_url {
        Some(url) => {
            info!("Enriching events from orchestrator at {}", url);
            let client = OrchestratorClient::with_client(url.clone(), http);
            Some(Arc::new(HttpBuildDetailRepository::new(client)) as Arc<dyn BuildDetailRepository>)
        }
        None => {
            info!("No orchestrator_url configured, events are sent as received");
            None
        }
    };

    let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(config), details, transport));

    // Build router with all API endpoints
    let app = api::create_router(dispatcher);

    info!("Listening on {}", cli.bind_addr);

    let listener = tokio::net::TcpListener::bind(&cli.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

/// HTTP client shared by the chat and orchestrator clients
fn reqwest_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")
}
