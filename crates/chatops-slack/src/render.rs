//! JSON bodies sent back to Slack.

use chatops_domain::{CommandResult, CommandStatus};
use serde_json::{json, Value};

pub const WEBHOOK_PROCESSED_MESSAGE: &str = "Webhook processed successfully";

/// Slash command reply. `details` is only exposed for pipeline selection.
pub fn render_command_result(result: &CommandResult) -> Value {
    let mut body = json!({
        "status": result.status.as_str(),
        "message": result.message,
    });
    if result.status == CommandStatus::SelectPipeline {
        body["details"] = result.details.clone().unwrap_or(Value::Null);
    }
    body
}

/// Events API reply wrapping the full outcome of the synthesized command.
pub fn render_webhook_result(result: &CommandResult) -> Value {
    json!({
        "status": CommandStatus::Success.as_str(),
        "message": WEBHOOK_PROCESSED_MESSAGE,
        "details": result,
    })
}

pub fn render_error(message: &str) -> Value {
    json!({
        "status": CommandStatus::Error.as_str(),
        "message": message,
    })
}
