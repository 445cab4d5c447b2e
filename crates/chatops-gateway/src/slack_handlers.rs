use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chatops_core::current_unix_timestamp;
use chatops_domain::{Command, CommandResult};
use chatops_slack::{
    parse_slack_event, render_command_result, render_webhook_result, verify_slack_signature,
    SlackEvent, SlashCommand, SLACK_SIGNATURE_HEADER, SLACK_TIMESTAMP_HEADER,
};
use serde_json::json;
use tracing::warn;

use crate::api_error::GatewayApiError;
use crate::gateway_server::ChatopsGatewayState;

pub(crate) async fn handle_slack_command(
    State(state): State<Arc<ChatopsGatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match slack_command_result(&state, &headers, &body).await {
        Ok(result) => (StatusCode::OK, Json(render_command_result(&result))).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn slack_command_result(
    state: &ChatopsGatewayState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<CommandResult, GatewayApiError> {
    authenticate(state, headers, body)?;
    let command = SlashCommand::from_form_body(body)?.to_command()?;
    dispatch_with_deadline(state, &command).await
}

pub(crate) async fn handle_slack_event(
    State(state): State<Arc<ChatopsGatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(error) = authenticate(&state, &headers, &body) {
        return error.into_response();
    }
    let event = match parse_slack_event(&body) {
        Ok(event) => event,
        Err(error) => return GatewayApiError::from(error).into_response(),
    };
    match event {
        SlackEvent::UrlVerification { challenge } => {
            (StatusCode::OK, Json(json!({ "challenge": challenge }))).into_response()
        }
        SlackEvent::WorkflowStep(command) => match dispatch_with_deadline(&state, &command).await {
            Ok(result) => (StatusCode::OK, Json(render_webhook_result(&result))).into_response(),
            Err(error) => error.into_response(),
        },
    }
}

fn authenticate(
    state: &ChatopsGatewayState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), GatewayApiError> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let now = i64::try_from(current_unix_timestamp()).unwrap_or(i64::MAX);
    verify_slack_signature(
        body,
        header(SLACK_TIMESTAMP_HEADER),
        header(SLACK_SIGNATURE_HEADER),
        &state.config.slack_signing_secret,
        now,
        state.config.signature_tolerance_seconds,
    )
    .map_err(|error| {
        warn!(error = %error, "slack signature verification failed");
        GatewayApiError::from(error)
    })
}

// Dropping the dispatch future on expiry cancels any in-flight platform call.
async fn dispatch_with_deadline(
    state: &ChatopsGatewayState,
    command: &Command,
) -> Result<CommandResult, GatewayApiError> {
    let deadline = Duration::from_millis(state.config.request_timeout_ms.max(1));
    match tokio::time::timeout(deadline, state.dispatcher.dispatch(command)).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(error)) => {
            warn!(
                command_id = command.id(),
                command_type = %command.command_type(),
                error = %error,
                "command dispatch failed"
            );
            Err(GatewayApiError::from(error))
        }
        Err(_) => {
            warn!(
                command_id = command.id(),
                deadline_ms = state.config.request_timeout_ms,
                "command dispatch exceeded request deadline"
            );
            Err(GatewayApiError::deadline_exceeded())
        }
    }
}
