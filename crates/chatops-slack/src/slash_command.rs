use chatops_domain::{Actor, Command, CommandOrigin, PLATFORM_SLACK};
use url::form_urlencoded;

use crate::command_text::{parse_command_text, CommandParseError};

/// Fields of a Slack slash command POST that the dispatcher cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommand {
    pub command: Option<String>,
    pub text: String,
    pub user_id: String,
    pub channel_id: String,
    pub team_id: Option<String>,
}

impl SlashCommand {
    /// Decodes an `application/x-www-form-urlencoded` body. Unknown fields are ignored.
    pub fn from_form_body(body: &[u8]) -> Result<Self, CommandParseError> {
        let mut decoded = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "command" => decoded.command = Some(value.into_owned()),
                "text" => decoded.text = value.into_owned(),
                "user_id" => decoded.user_id = value.into_owned(),
                "channel_id" => decoded.channel_id = value.into_owned(),
                "team_id" => decoded.team_id = Some(value.into_owned()),
                _ => {}
            }
        }
        if decoded.user_id.trim().is_empty() {
            return Err(CommandParseError::MissingField("user_id"));
        }
        Ok(decoded)
    }

    pub fn to_command(&self) -> Result<Command, CommandParseError> {
        parse_command_text(
            &self.text,
            Actor::new(self.user_id.clone(), PLATFORM_SLACK),
            CommandOrigin::channel(PLATFORM_SLACK, self.channel_id.clone()),
        )
    }
}
