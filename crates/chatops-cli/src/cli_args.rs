use std::path::PathBuf;

use clap::Parser;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "chatops",
    about = "Slack command dispatcher that registers repositories and triggers CI workflows",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "CHATOPS_BIND",
        default_value = "127.0.0.1:8080",
        help = "Address the HTTP gateway listens on"
    )]
    pub bind: String,

    #[arg(
        long = "slack-signing-secret",
        env = "CHATOPS_SLACK_SIGNING_SECRET",
        hide_env_values = true,
        help = "Slack app signing secret used to authenticate inbound requests"
    )]
    pub slack_signing_secret: String,

    #[arg(
        long = "slack-bot-token",
        env = "CHATOPS_SLACK_BOT_TOKEN",
        hide_env_values = true,
        help = "Slack bot token (accepted for deployment parity; replies are returned inline)"
    )]
    pub slack_bot_token: Option<String>,

    #[arg(
        long = "github-token",
        env = "CHATOPS_GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token; without it GitHub repositories cannot be registered or verified"
    )]
    pub github_token: Option<String>,

    #[arg(
        long = "github-api-base",
        env = "CHATOPS_GITHUB_API_BASE",
        default_value = "https://api.github.com",
        help = "Base URL for the GitHub REST API"
    )]
    pub github_api_base: String,

    #[arg(
        long = "github-request-timeout-ms",
        env = "CHATOPS_GITHUB_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Per-call timeout for GitHub API requests"
    )]
    pub github_request_timeout_ms: u64,

    #[arg(
        long = "state-db",
        env = "CHATOPS_STATE_DB",
        default_value = ".chatops/chatops.sqlite",
        help = "SQLite database holding the repository directory"
    )]
    pub state_db: PathBuf,

    #[arg(
        long = "request-timeout-ms",
        env = "CHATOPS_REQUEST_TIMEOUT_MS",
        default_value_t = 15_000,
        value_parser = parse_positive_u64,
        help = "Deadline for dispatching one inbound command, including external calls"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "signature-tolerance-seconds",
        env = "CHATOPS_SIGNATURE_TOLERANCE_SECONDS",
        default_value_t = 300,
        help = "Maximum clock skew accepted for Slack request timestamps"
    )]
    pub signature_tolerance_seconds: u64,

    #[arg(
        long = "log-level",
        env = "CHATOPS_LOG",
        default_value = "info",
        help = "Tracing filter directives, e.g. info or chatops_dispatch=debug"
    )]
    pub log_level: String,
}
