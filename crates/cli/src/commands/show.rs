//! Show command implementation.

use anyhow::Result;
use gluon_config::Provider;
use gluon_config::flatten::flatten;

use crate::formatters::{OutputFormat, get_formatter};

pub fn run(provider: &Provider, raw: bool, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let pairs = if raw {
        provider.document().map(flatten).unwrap_or_default()
    } else {
        provider.flattened()
    };
    if pairs.is_empty() {
        tracing::info!("No configuration document loaded");
    }
    println!("{}", get_formatter(format).format_pairs(&pairs)?);
    Ok(())
}
