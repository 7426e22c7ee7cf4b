//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//! - Build the provider once for the commands that read configuration.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Provider construction details (see `context` module).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::context::build_provider;

/// Dispatch CLI commands to their respective handlers.
pub(crate) fn run_command(cli: &Cli) -> Result<()> {
    if let Commands::EnvName { keys } = &cli.command {
        return commands::env_name::run(keys, &cli.output);
    }

    let provider = build_provider(cli)?;
    tracing::debug!(
        sources = provider.sources().len(),
        profile = provider.profile().unwrap_or(""),
        "Configuration ready"
    );

    match &cli.command {
        Commands::Get { key, default } => {
            commands::get::run(&provider, key, default.as_deref(), &cli.output)
        }
        Commands::Show { raw } => commands::show::run(&provider, *raw, &cli.output),
        Commands::Sources => commands::sources::run(&provider, &cli.output),
        Commands::Keys { path } => commands::keys::run(&provider, path.as_deref(), &cli.output),
        Commands::EnvName { keys } => commands::env_name::run(keys, &cli.output),
    }
}
