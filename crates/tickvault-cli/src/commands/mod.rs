mod get;
mod health;
mod list;

use serde::Serialize;
use tickvault_core::config::parse_ttl_hours;
use tickvault_core::{RetrievalConfig, RetrievalError};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Envelope;

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let config = resolve_config(cli)?;
    debug!(?config, "resolved configuration");

    match &cli.command {
        Command::Get(args) => envelope(get::run(args, &config).await),
        Command::List => envelope(list::run(&config).await),
        Command::Health => envelope(Ok(health::run(&config).await)),
    }
}

/// Environment first, then command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<RetrievalConfig, CliError> {
    let mut config = RetrievalConfig::from_env()?;

    if let Some(data_dir) = &cli.data_dir {
        config = config.with_data_dir(data_dir.clone());
    }
    if let Some(api_key) = &cli.api_key {
        config = config.with_api_key(api_key.clone());
    }
    if let Some(raw) = &cli.ttl_hours {
        config = config.with_ttl(parse_ttl_hours(raw)?);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_request_timeout_ms(timeout_ms);
    }

    Ok(config)
}

fn envelope<T: Serialize>(outcome: Result<T, RetrievalError>) -> Result<Envelope, CliError> {
    match outcome {
        Ok(data) => Ok(Envelope::ok(serde_json::to_value(data)?)),
        Err(error) => Ok(Envelope::failure(error)),
    }
}
