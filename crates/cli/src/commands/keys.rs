//! Keys command implementation.

use anyhow::Result;
use gluon_config::key::PropertyKey;
use gluon_config::{NodeMode, Provider};

use crate::error::KeyNotFound;
use crate::formatters::{OutputFormat, get_formatter};

pub fn run(provider: &Provider, path: Option<&str>, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let keys = match path {
        None => provider.root().keys(),
        Some(path) => {
            PropertyKey::parse(path)?;
            let node = provider.node(path);
            if node.mode() == NodeMode::Detached {
                return Err(KeyNotFound(path.to_string()).into());
            }
            node.keys()
        }
    };
    println!("{}", get_formatter(format).format_keys(&keys)?);
    Ok(())
}
