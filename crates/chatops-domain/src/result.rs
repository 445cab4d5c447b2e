use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Pipeline;

/// Outcome status rendered to the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Success,
    Error,
    SelectPipeline,
}

impl CommandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::SelectPipeline => "select_pipeline",
        }
    }
}

/// Uniform outcome of a dispatched command, serialized as
/// `{status, message, details?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: message.into(),
            details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Error,
            message: message.into(),
            details: None,
        }
    }

    /// Asks the caller to choose among `pipelines`, carried in `details`.
    pub fn select_pipeline(message: impl Into<String>, pipelines: &[Pipeline]) -> Self {
        Self {
            status: CommandStatus::SelectPipeline,
            message: message.into(),
            details: Some(serde_json::to_value(pipelines).unwrap_or(Value::Array(Vec::new()))),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}
