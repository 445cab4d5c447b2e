//! Parser for free-form chat command text such as `verify repo`.

use std::collections::BTreeMap;

use chatops_domain::{
    Actor, Command, CommandOrigin, CommandType, PARAM_REPOSITORY_NAME, PARAM_REPOSITORY_URL,
};
use serde_json::Value;
use thiserror::Error;

/// Malformed command input. Rejected at the boundary, before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("invalid command format: expected at least 2 parts, got {0}")]
    Format(usize),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Parses `<action> <argument> [name]` into a typed command.
///
/// `manage <url> [name]` registers a repository; the optional name is only
/// needed for URLs that cannot be enriched. `verify <name>` runs its pipeline.
pub fn parse_command_text(
    raw_text: &str,
    actor: Actor,
    origin: CommandOrigin,
) -> Result<Command, CommandParseError> {
    let parts = raw_text.split_whitespace().collect::<Vec<_>>();
    if parts.len() < 2 {
        return Err(CommandParseError::Format(parts.len()));
    }

    let mut parameters = BTreeMap::new();
    let command_type = match parts[0] {
        "manage" => {
            parameters.insert(
                PARAM_REPOSITORY_URL.to_string(),
                Value::String(parts[1].to_string()),
            );
            if let Some(name) = parts.get(2) {
                parameters.insert(
                    PARAM_REPOSITORY_NAME.to_string(),
                    Value::String((*name).to_string()),
                );
            }
            CommandType::ManageRepository
        }
        "verify" => {
            parameters.insert(
                PARAM_REPOSITORY_NAME.to_string(),
                Value::String(parts[1].to_string()),
            );
            CommandType::VerifyRepository
        }
        other => return Err(CommandParseError::UnknownAction(other.to_string())),
    };

    Ok(Command::new(command_type, parameters, actor, origin))
}
