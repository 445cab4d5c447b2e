//! Slack Events API payloads: URL verification and workflow step execution.

use std::collections::BTreeMap;

use chatops_domain::{
    Actor, Command, CommandOrigin, CommandType, UnknownCommandType, PARAM_ACTION,
    PARAM_REPOSITORY_NAME, PARAM_REPOSITORY_URL, PLATFORM_SLACK,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Actor id used for commands synthesized from workflow steps.
pub const WORKFLOW_ACTOR_ID: &str = "workflow";

const WORKFLOW_STEP_EXECUTE: &str = "workflow_step_execute";

#[derive(Debug, Clone, PartialEq)]
pub enum SlackEvent {
    UrlVerification { challenge: String },
    WorkflowStep(Command),
}

#[derive(Debug, Error)]
pub enum SlackEventError {
    #[error("failed to parse webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("unsupported event type: {0}")]
    UnsupportedEventType(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    UnknownCommandType(#[from] UnknownCommandType),
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    envelope_type: String,
    #[serde(default)]
    challenge: Option<String>,
    #[serde(default)]
    event: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WorkflowStep {
    #[serde(default)]
    workflow_id: Option<String>,
    #[serde(default)]
    step_id: Option<String>,
    #[serde(default)]
    inputs: Map<String, Value>,
}

/// Decodes an Events API body.
///
/// Workflow step executions are accepted both bare (`type:
/// workflow_step_execute`) and wrapped in an `event_callback` envelope.
pub fn parse_slack_event(body: &[u8]) -> Result<SlackEvent, SlackEventError> {
    let envelope = serde_json::from_slice::<EventEnvelope>(body)?;
    match envelope.envelope_type.as_str() {
        "url_verification" => Ok(SlackEvent::UrlVerification {
            challenge: envelope
                .challenge
                .ok_or(SlackEventError::MissingField("challenge"))?,
        }),
        WORKFLOW_STEP_EXECUTE => {
            workflow_step_command(envelope.event).map(SlackEvent::WorkflowStep)
        }
        "event_callback" => {
            let inner_type = envelope
                .event
                .as_ref()
                .and_then(|event| event.get("type"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if inner_type != WORKFLOW_STEP_EXECUTE {
                return Err(SlackEventError::UnsupportedEventType(inner_type));
            }
            workflow_step_command(envelope.event).map(SlackEvent::WorkflowStep)
        }
        other => Err(SlackEventError::UnsupportedEventType(other.to_string())),
    }
}

fn workflow_step_command(event: Option<Value>) -> Result<Command, SlackEventError> {
    let step_value = event
        .and_then(|mut event| event.get_mut("workflow_step").map(Value::take))
        .ok_or(SlackEventError::MissingField("workflow_step"))?;
    let step = serde_json::from_value::<WorkflowStep>(step_value)?;

    let workflow_id = step
        .workflow_id
        .ok_or(SlackEventError::MissingField("workflow_id"))?;
    let step_id = step.step_id.ok_or(SlackEventError::MissingField("step_id"))?;
    let repository =
        input_text(&step.inputs, "repository").ok_or(SlackEventError::MissingField("repository"))?;
    let command_type = match input_text(&step.inputs, "command") {
        Some(label) => label.parse::<CommandType>()?,
        None => CommandType::VerifyRepository,
    };

    let mut parameters = BTreeMap::new();
    match command_type {
        CommandType::VerifyRepository => {
            parameters.insert(PARAM_REPOSITORY_NAME.to_string(), Value::String(repository));
        }
        CommandType::ManageRepository => {
            parameters.insert(PARAM_REPOSITORY_URL.to_string(), Value::String(repository));
            if let Some(name) = input_text(&step.inputs, "name") {
                parameters.insert(PARAM_REPOSITORY_NAME.to_string(), Value::String(name));
            }
        }
    }
    if let Some(action) = input_text(&step.inputs, "action") {
        parameters.insert(PARAM_ACTION.to_string(), Value::String(action));
    }

    Ok(Command::new(
        command_type,
        parameters,
        Actor::new(WORKFLOW_ACTOR_ID, PLATFORM_SLACK),
        CommandOrigin::workflow_step(PLATFORM_SLACK, workflow_id, step_id),
    ))
}

// Workflow inputs arrive either as plain strings or as `{ "value": "..." }`.
fn input_text(inputs: &Map<String, Value>, key: &str) -> Option<String> {
    let value = inputs.get(key)?;
    let text = value
        .as_str()
        .or_else(|| value.get("value").and_then(Value::as_str))?
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}
