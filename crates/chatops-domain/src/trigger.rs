use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TRIGGER_TYPE_VERIFICATION: &str = "verification";
pub const DEFAULT_WORKFLOW_REF: &str = "main";

/// Ephemeral request to run one pipeline on the CI platform. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTrigger {
    /// Repository name as registered in the directory.
    pub repository: String,
    /// Registered repository URL, used to address the repository on the platform.
    pub repository_url: String,
    /// Pipeline path to run.
    pub workflow: String,
    #[serde(rename = "type")]
    pub trigger_type: String,
    /// Branch or tag the workflow runs against.
    pub git_ref: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl WorkflowTrigger {
    pub fn verification(
        repository: impl Into<String>,
        repository_url: impl Into<String>,
        workflow: impl Into<String>,
        default_branch: &str,
    ) -> Self {
        let git_ref = match default_branch.trim() {
            "" => DEFAULT_WORKFLOW_REF.to_string(),
            branch => branch.to_string(),
        };
        Self {
            repository: repository.into(),
            repository_url: repository_url.into(),
            workflow: workflow.into(),
            trigger_type: TRIGGER_TYPE_VERIFICATION.to_string(),
            git_ref,
            parameters: BTreeMap::new(),
        }
    }
}
