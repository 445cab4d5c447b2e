use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatops_domain::{
    Actor, Command, CommandOrigin, CommandType, Pipeline, WorkflowTrigger, PLATFORM_SLACK,
};
use chatops_store::InMemoryRepositoryStore;
use serde_json::Value;

use crate::platform::{PlatformError, RepositoryDetails, SourceHostingPlatform};
use crate::{CommandDispatcher, RepositoryResolver, WorkflowTriggerClient};

pub(crate) struct FakePlatform {
    details: Result<RepositoryDetails, PlatformError>,
    trigger_outcome: Result<u16, PlatformError>,
    fetched_urls: Mutex<Vec<String>>,
    triggers: Mutex<Vec<WorkflowTrigger>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            details: Ok(RepositoryDetails {
                name: "repo".to_string(),
                url: "https://github.com/org/repo".to_string(),
                default_branch: "main".to_string(),
                pipelines: vec![Pipeline::new("CI", ".github/workflows/ci.yml", true)],
            }),
            trigger_outcome: Ok(204),
            fetched_urls: Mutex::new(Vec::new()),
            triggers: Mutex::new(Vec::new()),
        }
    }
}

impl FakePlatform {
    pub(crate) fn with_details(
        mut self,
        details: Result<RepositoryDetails, PlatformError>,
    ) -> Self {
        self.details = details;
        self
    }

    pub(crate) fn with_trigger_outcome(mut self, outcome: Result<u16, PlatformError>) -> Self {
        self.trigger_outcome = outcome;
        self
    }

    pub(crate) fn recorded_triggers(&self) -> Vec<WorkflowTrigger> {
        self.triggers.lock().expect("triggers lock").clone()
    }

    pub(crate) fn fetched_urls(&self) -> Vec<String> {
        self.fetched_urls.lock().expect("fetch lock").clone()
    }
}

#[async_trait]
impl SourceHostingPlatform for FakePlatform {
    fn platform_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_repository(&self, url: &str) -> Result<RepositoryDetails, PlatformError> {
        self.fetched_urls
            .lock()
            .expect("fetch lock")
            .push(url.to_string());
        self.details.clone()
    }

    async fn trigger_workflow(&self, trigger: &WorkflowTrigger) -> Result<u16, PlatformError> {
        self.triggers
            .lock()
            .expect("triggers lock")
            .push(trigger.clone());
        self.trigger_outcome.clone()
    }
}

pub(crate) fn dispatcher_with(
    store: Arc<InMemoryRepositoryStore>,
    platform: Option<Arc<FakePlatform>>,
) -> CommandDispatcher {
    let platform = platform.map(|platform| platform as Arc<dyn SourceHostingPlatform>);
    CommandDispatcher::new(
        RepositoryResolver::new(store, platform.clone()),
        WorkflowTriggerClient::new(platform),
    )
}

pub(crate) fn slack_command(command_type: CommandType, parameters: &[(&str, Value)]) -> Command {
    Command::new(
        command_type,
        parameters
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect::<BTreeMap<_, _>>(),
        Actor::new("U123", PLATFORM_SLACK),
        CommandOrigin::channel(PLATFORM_SLACK, "C123"),
    )
}
