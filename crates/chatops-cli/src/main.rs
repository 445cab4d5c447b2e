mod bootstrap;
mod cli_args;

use anyhow::Result;
use chatops_gateway::run_chatops_gateway_server;
use clap::Parser;

use crate::bootstrap::{build_dispatcher, gateway_config, init_tracing};
use crate::cli_args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env only fill variables the environment does not already set.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = gateway_config(&cli)?;
    let dispatcher = build_dispatcher(&cli)?;
    run_chatops_gateway_server(config, dispatcher).await
}
