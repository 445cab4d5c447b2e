//! Slack boundary: request authentication, command text parsing, inbound
//! payload decoding and response rendering.

pub mod command_text;
pub mod events;
pub mod render;
pub mod signature;
pub mod slash_command;

pub use command_text::{parse_command_text, CommandParseError};
pub use events::{parse_slack_event, SlackEvent, SlackEventError, WORKFLOW_ACTOR_ID};
pub use render::{render_command_result, render_error, render_webhook_result};
pub use signature::{
    compute_slack_signature, verify_slack_signature, SignatureError,
    DEFAULT_SIGNATURE_TOLERANCE_SECONDS, SLACK_SIGNATURE_HEADER, SLACK_TIMESTAMP_HEADER,
};
pub use slash_command::SlashCommand;
