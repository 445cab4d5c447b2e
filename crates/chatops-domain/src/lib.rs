//! Shared data types for chatops command dispatch.
//!
//! Commands describe what an operator asked for, repositories and pipelines
//! describe what the directory knows, and `CommandResult` is the uniform
//! outcome rendered back to the chat platform.

mod command;
mod repository;
mod result;
mod trigger;

pub use command::{
    Actor, Command, CommandOrigin, CommandType, UnknownCommandType, PARAM_ACTION,
    PARAM_REPOSITORY_NAME, PARAM_REPOSITORY_URL, PLATFORM_SLACK,
};
pub use repository::{DefaultPipelineMark, Pipeline, Repository};
pub use result::{CommandResult, CommandStatus};
pub use trigger::{WorkflowTrigger, DEFAULT_WORKFLOW_REF, TRIGGER_TYPE_VERIFICATION};
