//! Provider construction from CLI arguments.
//!
//! Responsibilities:
//! - Translate global options into a `ProviderBuilder` chain.
//! - Resolve the default document directory when none is given.
//!
//! Does NOT handle:
//! - `.env` loading (done in `main()` before clap parsing).
//! - Command execution (see `dispatch` module).
//!
//! Invariants:
//! - `--file` wins over `--dir`; with neither, `application.yaml` in the
//!   per-user config directory is used if it exists.
//! - `--set` overrides are parsed as flags but registered above the
//!   environment, so they win over every other source.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use gluon_config::constants::{DOCUMENT_FILE_NAME, ENV_PRIORITY};
use gluon_config::key::flag_name;
use gluon_config::{FlagsSource, MergeMode, Provider, ProviderBuilder};
use std::path::PathBuf;

use crate::args::Cli;

/// `--set` values outrank the environment.
const OVERRIDE_PRIORITY: i32 = ENV_PRIORITY + 100;

/// `application.yaml` in the per-user configuration directory, if present.
pub(crate) fn default_document() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "gluon")?;
    let path = dirs.config_dir().join(DOCUMENT_FILE_NAME);
    path.is_file().then_some(path)
}

/// Flag arguments equivalent to the `--set` overrides.
pub(crate) fn override_args(overrides: &[(String, String)]) -> Vec<String> {
    overrides
        .iter()
        .map(|(key, value)| format!("--{}={}", flag_name(key), value))
        .collect()
}

pub(crate) fn build_provider(cli: &Cli) -> Result<Provider> {
    let mut builder = ProviderBuilder::new();

    if !cli.no_env {
        builder = builder.with_env();
    }
    if !cli.overrides.is_empty() {
        let overrides =
            FlagsSource::from_args(override_args(&cli.overrides)).with_priority(OVERRIDE_PRIORITY);
        builder = builder.with_source(Box::new(overrides));
    }
    if let Some(ref profile) = cli.profile {
        builder = builder.with_profile(profile.clone());
    }
    if cli.strict {
        builder = builder.with_merge_mode(MergeMode::Strict);
    }

    // Blank paths are ignored so an empty env var falls back to the default.
    let file = cli
        .file
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty());
    let dir = cli.dir.as_ref().filter(|p| !p.as_os_str().is_empty());

    if let Some(path) = file {
        builder = builder.with_document_file(path.clone());
    } else if let Some(dir) = dir {
        builder = builder.with_document_dir(dir.clone());
    } else if let Some(path) = default_document() {
        tracing::debug!(path = %path.display(), "Using default config document");
        builder = builder.with_document_file(path);
    }

    builder.build().context("Failed to build configuration")
}
