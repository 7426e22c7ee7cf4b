//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse `--set KEY=VALUE` overrides.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not build the provider (see `context` module).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gluon")]
#[command(about = "Inspect layered gluon configuration", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  gluon --dir ./conf get app.db.user\n  gluon --profile dev show\n  gluon --set app.http.port=9090 get app.http.port\n  gluon env-name app.db.user\n"
)]
pub struct Cli {
    /// Directory searched for application.yaml
    #[arg(short, long, global = true, env = "GLUON_CONFIG_DIR", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Explicit document path (takes precedence over --dir)
    #[arg(short, long, global = true, env = "GLUON_CONFIG_FILE", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Profile to activate (overrides gluon.config.profile)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Reject profile overlays that change a value's shape
    #[arg(long, global = true)]
    pub strict: bool,

    /// Do not read the process environment as a source
    #[arg(long, global = true)]
    pub no_env: bool,

    /// Override a key (repeatable), e.g. --set app.db.user=alice
    #[arg(short = 's', long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve one key through the sources and the document tree
    Get {
        /// Dotted key, e.g. app.db.user or app.db.list[0]
        key: String,

        /// Value printed when the key is not set anywhere
        #[arg(long)]
        default: Option<String>,
    },

    /// Print the profile-merged document as dotted keys
    Show {
        /// Print the document before the profile overlay
        #[arg(long)]
        raw: bool,
    },

    /// List registered sources in lookup order
    Sources,

    /// List the keys of the mapping at a path
    Keys {
        /// Dotted path (root when omitted)
        path: Option<String>,
    },

    /// Show the environment variable and flag names for keys
    EnvName {
        /// Dotted keys
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

/// Parse a `KEY=VALUE` override.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid override '{s}': expected KEY=VALUE"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid override '{s}': key is empty"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
