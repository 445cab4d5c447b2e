use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chatops_core::next_identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const PARAM_REPOSITORY_URL: &str = "repository_url";
pub const PARAM_REPOSITORY_NAME: &str = "repository_name";
pub const PARAM_ACTION: &str = "action";
pub const PLATFORM_SLACK: &str = "slack";

/// Error returned when a command type label is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command type: {0}")]
pub struct UnknownCommandType(pub String);

/// Closed set of commands the dispatcher routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    ManageRepository,
    VerifyRepository,
}

impl CommandType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageRepository => "manage_repository",
            Self::VerifyRepository => "verify_repository",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandType {
    type Err = UnknownCommandType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "manage_repository" => Ok(Self::ManageRepository),
            "verify_repository" => Ok(Self::VerifyRepository),
            other => Err(UnknownCommandType(other.to_string())),
        }
    }
}

/// Where a command came from.
///
/// Typed commands carry a channel id; commands synthesized from an automation
/// event carry the workflow and step ids instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOrigin {
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
}

impl CommandOrigin {
    pub fn channel(platform: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            channel_id: Some(channel_id.into()),
            workflow_id: None,
            step_id: None,
        }
    }

    pub fn workflow_step(
        platform: impl Into<String>,
        workflow_id: impl Into<String>,
        step_id: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            channel_id: None,
            workflow_id: Some(workflow_id.into()),
            step_id: Some(step_id.into()),
        }
    }

    pub fn is_automation(&self) -> bool {
        self.workflow_id.is_some()
    }
}

/// The user (or automation) issuing a command. Permissions are not populated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub platform: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            platform: platform.into(),
            permissions: Vec::new(),
        }
    }
}

/// One parsed, typed intent. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    id: String,
    command_type: CommandType,
    parameters: BTreeMap<String, Value>,
    origin: CommandOrigin,
    actor: Actor,
    created_at: DateTime<Utc>,
}

impl Command {
    /// Builds a command stamped with a fresh id and the current time.
    pub fn new(
        command_type: CommandType,
        parameters: BTreeMap<String, Value>,
        actor: Actor,
        origin: CommandOrigin,
    ) -> Self {
        Self {
            id: next_identifier("cmd"),
            command_type,
            parameters,
            origin,
            actor,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Returns the named parameter only when it is present and a string.
    pub fn string_parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(Value::as_str)
    }

    pub fn origin(&self) -> &CommandOrigin {
        &self.origin
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
