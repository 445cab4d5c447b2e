//! Normalizes CI dispatch outcomes into `CommandResult` values.

use std::sync::Arc;

use chatops_domain::{CommandResult, WorkflowTrigger};
use tracing::{info, warn};

use crate::platform::SourceHostingPlatform;

pub const WORKFLOW_TRIGGERED_MESSAGE: &str = "Workflow triggered successfully";

/// Invokes the CI platform's dispatch API.
///
/// Never fails: transport errors, HTTP rejections and a missing integration all
/// come back as error-status results.
#[derive(Clone)]
pub struct WorkflowTriggerClient {
    platform: Option<Arc<dyn SourceHostingPlatform>>,
}

impl WorkflowTriggerClient {
    pub fn new(platform: Option<Arc<dyn SourceHostingPlatform>>) -> Self {
        Self { platform }
    }

    pub async fn trigger(&self, trigger: &WorkflowTrigger) -> CommandResult {
        let Some(platform) = self.platform.as_ref() else {
            warn!(
                repository = %trigger.repository,
                "workflow trigger skipped: no source hosting integration configured"
            );
            return CommandResult::error(
                "Failed to trigger workflow: source hosting integration is not configured",
            );
        };

        match platform.trigger_workflow(trigger).await {
            Err(error) => {
                warn!(
                    repository = %trigger.repository,
                    workflow = %trigger.workflow,
                    error = %error,
                    "workflow dispatch request failed"
                );
                CommandResult::error(format!("Failed to trigger workflow: {error}"))
            }
            Ok(status) if status >= 400 => {
                warn!(
                    repository = %trigger.repository,
                    workflow = %trigger.workflow,
                    status,
                    "workflow dispatch rejected"
                );
                CommandResult::error(format!("Failed to trigger workflow: HTTP {status}"))
            }
            Ok(status) => {
                info!(
                    repository = %trigger.repository,
                    workflow = %trigger.workflow,
                    git_ref = %trigger.git_ref,
                    status,
                    "workflow dispatched"
                );
                CommandResult::success(WORKFLOW_TRIGGERED_MESSAGE)
            }
        }
    }
}
