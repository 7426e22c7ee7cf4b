//! Sources command implementation.

use anyhow::Result;
use gluon_config::Provider;

use crate::formatters::{OutputFormat, SourceRow, get_formatter};

pub fn run(provider: &Provider, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let rows: Vec<SourceRow> = provider
        .sources()
        .iter()
        .map(|source| SourceRow {
            name: source.name().to_string(),
            priority: source.priority(),
            properties: source.properties().len(),
        })
        .collect();
    println!("{}", get_formatter(format).format_sources(&rows)?);
    Ok(())
}
