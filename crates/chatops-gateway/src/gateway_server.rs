use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use chatops_dispatch::CommandDispatcher;
use chatops_slack::DEFAULT_SIGNATURE_TOLERANCE_SECONDS;
use tokio::net::TcpListener;
use tracing::info;

use crate::health::{handle_health, handle_liveness};
use crate::request_logging::log_requests;
use crate::slack_handlers::{handle_slack_command, handle_slack_event};

pub const SLACK_COMMANDS_ENDPOINT: &str = "/api/v1/slack/commands";
pub const SLACK_EVENTS_ENDPOINT: &str = "/api/v1/slack/events";
pub const HEALTH_ENDPOINT: &str = "/health";
pub const HEALTH_LIVE_ENDPOINT: &str = "/health/live";

#[derive(Debug, Clone)]
pub struct ChatopsGatewayConfig {
    pub bind: String,
    pub slack_signing_secret: String,
    pub signature_tolerance_seconds: u64,
    /// Deadline applied to each dispatch, including every external call it makes.
    pub request_timeout_ms: u64,
}

impl Default for ChatopsGatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            slack_signing_secret: String::new(),
            signature_tolerance_seconds: DEFAULT_SIGNATURE_TOLERANCE_SECONDS,
            request_timeout_ms: 15_000,
        }
    }
}

pub struct ChatopsGatewayState {
    pub(crate) config: ChatopsGatewayConfig,
    pub(crate) dispatcher: CommandDispatcher,
}

impl ChatopsGatewayState {
    pub fn new(config: ChatopsGatewayConfig, dispatcher: CommandDispatcher) -> Self {
        Self { config, dispatcher }
    }
}

pub fn build_chatops_gateway_router(state: Arc<ChatopsGatewayState>) -> Router {
    Router::new()
        .route(SLACK_COMMANDS_ENDPOINT, post(handle_slack_command))
        .route(SLACK_EVENTS_ENDPOINT, post(handle_slack_event))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .route(HEALTH_LIVE_ENDPOINT, get(handle_liveness))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Serves the gateway until Ctrl-C, then drains in-flight requests.
pub async fn run_chatops_gateway_server(
    config: ChatopsGatewayConfig,
    dispatcher: CommandDispatcher,
) -> Result<()> {
    if config.slack_signing_secret.trim().is_empty() {
        bail!("--slack-signing-secret must be provided");
    }
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}': expected host:port", config.bind))?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind chatops gateway on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve chatops gateway listen address")?;
    info!(
        addr = %local_addr,
        request_timeout_ms = config.request_timeout_ms,
        "chatops gateway listening"
    );

    let app = build_chatops_gateway_router(Arc::new(ChatopsGatewayState::new(config, dispatcher)));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("chatops gateway server exited unexpectedly")?;
    info!("chatops gateway stopped");
    Ok(())
}
