//! Env-name command implementation.

use anyhow::Result;
use gluon_config::key::{env_name, flag_name};

use crate::formatters::{KeyNames, OutputFormat, get_formatter};

pub fn run(keys: &[String], output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let names: Vec<KeyNames> = keys
        .iter()
        .map(|key| KeyNames {
            key: key.clone(),
            env: env_name(key),
            flag: flag_name(key),
        })
        .collect();
    println!("{}", get_formatter(format).format_key_names(&names)?);
    Ok(())
}
