//! Routes parsed commands to their handlers.

use chatops_core::next_identifier;
use chatops_domain::{
    Command, CommandResult, CommandType, Repository, WorkflowTrigger, PARAM_REPOSITORY_NAME,
    PARAM_REPOSITORY_URL,
};
use tracing::{debug, info};

use crate::error::{DispatchError, DispatchResult};
use crate::rbac::required_permission;
use crate::resolver::RepositoryResolver;
use crate::selector::{select_pipeline, PipelineDecision};
use crate::trigger_client::WorkflowTriggerClient;

pub const NO_PIPELINES_MESSAGE: &str = "No pipelines found for this repository";
pub const SELECT_PIPELINE_MESSAGE: &str = "Please select a pipeline to run";

/// Stateless command router. Holds no locks; the directory handles atomicity.
#[derive(Clone)]
pub struct CommandDispatcher {
    resolver: RepositoryResolver,
    trigger_client: WorkflowTriggerClient,
}

impl CommandDispatcher {
    pub fn new(resolver: RepositoryResolver, trigger_client: WorkflowTriggerClient) -> Self {
        Self {
            resolver,
            trigger_client,
        }
    }

    pub fn resolver(&self) -> &RepositoryResolver {
        &self.resolver
    }

    /// Executes `command` and returns the user-facing outcome.
    ///
    /// Validation, lookup and enrichment problems are returned as errors. A
    /// failed workflow dispatch is a successful call with an error-status result.
    pub async fn dispatch(&self, command: &Command) -> DispatchResult<CommandResult> {
        let command_type = command.command_type();
        debug!(
            command_id = command.id(),
            command_type = %command_type,
            user_id = %command.actor().user_id,
            platform = %command.origin().platform,
            automation = command.origin().is_automation(),
            required_permission = required_permission(command_type),
            "dispatching command"
        );

        match command_type {
            CommandType::ManageRepository => self.handle_manage_repository(command).await,
            CommandType::VerifyRepository => self.handle_verify_repository(command).await,
        }
    }

    async fn handle_manage_repository(&self, command: &Command) -> DispatchResult<CommandResult> {
        let url = command
            .string_parameter(PARAM_REPOSITORY_URL)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| DispatchError::validation("invalid repository URL"))?;

        let mut stub = Repository::stub(
            next_identifier("repo"),
            url,
            command.actor().user_id.clone(),
            command.created_at(),
        );
        if let Some(name) = command.string_parameter(PARAM_REPOSITORY_NAME) {
            stub.name = name.trim().to_string();
        }

        let repository = self.resolver.add_repository(stub).await?;
        info!(
            command_id = command.id(),
            repository = %repository.name,
            "manage command completed"
        );
        Ok(CommandResult::success(format!(
            "Repository {} has been added successfully",
            repository.name
        )))
    }

    async fn handle_verify_repository(&self, command: &Command) -> DispatchResult<CommandResult> {
        let name = command
            .string_parameter(PARAM_REPOSITORY_NAME)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DispatchError::validation("invalid repository name"))?;

        let repository = self.resolver.get_repository(name).await?;
        match select_pipeline(&repository.pipelines) {
            PipelineDecision::NoPipelines => Ok(CommandResult::error(NO_PIPELINES_MESSAGE)),
            PipelineDecision::AskUser(pipelines) => Ok(CommandResult::select_pipeline(
                SELECT_PIPELINE_MESSAGE,
                &pipelines,
            )),
            PipelineDecision::Run(pipeline) => {
                let trigger = WorkflowTrigger::verification(
                    repository.name.clone(),
                    repository.url.clone(),
                    pipeline.path.clone(),
                    &repository.default_branch,
                );
                info!(
                    command_id = command.id(),
                    repository = %repository.name,
                    pipeline = %pipeline.name,
                    "triggering verification workflow"
                );
                Ok(self.trigger_client.trigger(&trigger).await)
            }
        }
    }
}
