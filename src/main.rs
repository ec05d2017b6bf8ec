mod cli;
mod compose;
mod config;
mod error;
mod handlers;
mod resolve;
mod slack;
mod upgrade;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::Cli;

/// Env var holding a tracing filter directive, e.g. `SLACK_LOG=debug`
const LOG_ENV: &str = "SLACK_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_from(cli::normalize_args(std::env::args()));
    let action = match cli.action() {
        Ok(action) => action,
        Err(e) => Cli::command().error(e.kind(), e).exit(),
    };

    let code = handlers::run(action, cli.config.as_deref()).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
