//! HTTP boundary for chatops command dispatch.
//!
//! Authenticates Slack requests, turns them into commands, runs them through
//! the dispatcher under a request deadline and renders the outcome as JSON.

mod api_error;
mod gateway_server;
mod health;
mod request_logging;
mod slack_handlers;

pub use api_error::GatewayApiError;
pub use gateway_server::{
    build_chatops_gateway_router, run_chatops_gateway_server, ChatopsGatewayConfig,
    ChatopsGatewayState, HEALTH_ENDPOINT, HEALTH_LIVE_ENDPOINT, SLACK_COMMANDS_ENDPOINT,
    SLACK_EVENTS_ENDPOINT,
};
pub use request_logging::REQUEST_ID_HEADER;
