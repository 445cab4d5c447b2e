use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chatops_dispatch::{
    CommandDispatcher, RepositoryResolver, SourceHostingPlatform, WorkflowTriggerClient,
};
use chatops_gateway::ChatopsGatewayConfig;
use chatops_github::GithubApiClient;
use chatops_store::SqliteRepositoryStore;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli_args::Cli;

pub(crate) fn init_tracing(directives: &str) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

pub(crate) fn gateway_config(cli: &Cli) -> Result<ChatopsGatewayConfig> {
    let slack_signing_secret = cli.slack_signing_secret.trim();
    if slack_signing_secret.is_empty() {
        bail!("--slack-signing-secret must not be empty");
    }
    Ok(ChatopsGatewayConfig {
        bind: cli.bind.trim().to_string(),
        slack_signing_secret: slack_signing_secret.to_string(),
        signature_tolerance_seconds: cli.signature_tolerance_seconds,
        request_timeout_ms: cli.request_timeout_ms,
    })
}

pub(crate) fn build_dispatcher(cli: &Cli) -> Result<CommandDispatcher> {
    let store = SqliteRepositoryStore::new(&cli.state_db).with_context(|| {
        format!(
            "failed to open repository directory '{}'",
            cli.state_db.display()
        )
    })?;
    info!(state_db = %cli.state_db.display(), "repository directory ready");

    let platform = match cli
        .github_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        Some(token) => {
            let client =
                GithubApiClient::new(&cli.github_api_base, token, cli.github_request_timeout_ms)?;
            info!(api_base = %cli.github_api_base, "github integration enabled");
            Some(Arc::new(client) as Arc<dyn SourceHostingPlatform>)
        }
        None => {
            warn!("no github token configured; github repositories cannot be registered");
            None
        }
    };

    Ok(CommandDispatcher::new(
        RepositoryResolver::new(Arc::new(store), platform.clone()),
        WorkflowTriggerClient::new(platform),
    ))
}
