//! Output formatters for CLI commands.
//!
//! Provides two output formats: plain text for shells and JSON for tooling.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => anyhow::bail!("Invalid output format: {}. Valid options: text, json", s),
        }
    }
}

/// A resolved key and where its value came from.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved {
    pub key: String,
    pub value: String,
    /// `env`, `flags`, `document`, `tree` or `default`.
    pub origin: String,
    /// Spelling of the key that matched, e.g. `+dev.app.db.user`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

/// One row of the `sources` listing.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRow {
    pub name: String,
    pub priority: i32,
    pub properties: usize,
}

/// Names a key maps to in each flat source.
#[derive(Debug, Clone, Serialize)]
pub struct KeyNames {
    pub key: String,
    pub env: String,
    pub flag: String,
}

/// Formatter trait for different output types.
pub trait Formatter {
    fn format_resolved(&self, resolved: &Resolved) -> Result<String>;

    fn format_pairs(&self, pairs: &BTreeMap<String, String>) -> Result<String>;

    fn format_keys(&self, keys: &[String]) -> Result<String>;

    fn format_sources(&self, sources: &[SourceRow]) -> Result<String>;

    fn format_key_names(&self, names: &[KeyNames]) -> Result<String>;
}

/// Plain text, one item per line.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_resolved(&self, resolved: &Resolved) -> Result<String> {
        Ok(resolved.value.clone())
    }

    fn format_pairs(&self, pairs: &BTreeMap<String, String>) -> Result<String> {
        Ok(pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn format_keys(&self, keys: &[String]) -> Result<String> {
        Ok(keys.join("\n"))
    }

    fn format_sources(&self, sources: &[SourceRow]) -> Result<String> {
        let name_width = sources
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());
        let mut lines = vec![format!("{:<name_width$}  PRIORITY  PROPERTIES", "NAME")];
        for source in sources {
            lines.push(format!(
                "{:<name_width$}  {:>8}  {:>10}",
                source.name, source.priority, source.properties
            ));
        }
        Ok(lines.join("\n"))
    }

    fn format_key_names(&self, names: &[KeyNames]) -> Result<String> {
        Ok(names
            .iter()
            .map(|n| format!("{}\t{}\t--{}", n.key, n.env, n.flag))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Pretty-printed JSON.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_resolved(&self, resolved: &Resolved) -> Result<String> {
        Ok(serde_json::to_string_pretty(resolved)?)
    }

    fn format_pairs(&self, pairs: &BTreeMap<String, String>) -> Result<String> {
        Ok(serde_json::to_string_pretty(pairs)?)
    }

    fn format_keys(&self, keys: &[String]) -> Result<String> {
        Ok(serde_json::to_string_pretty(keys)?)
    }

    fn format_sources(&self, sources: &[SourceRow]) -> Result<String> {
        Ok(serde_json::to_string_pretty(sources)?)
    }

    fn format_key_names(&self, names: &[KeyNames]) -> Result<String> {
        Ok(serde_json::to_string_pretty(names)?)
    }
}

/// Get a formatter for the specified output format.
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats_case_insensitively() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn text_sources_table_is_aligned() {
        let out = TextFormatter
            .format_sources(&[
                SourceRow {
                    name: "env".into(),
                    priority: 300,
                    properties: 12,
                },
                SourceRow {
                    name: "document".into(),
                    priority: 100,
                    properties: 3,
                },
            ])
            .unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "NAME      PRIORITY  PROPERTIES");
        assert_eq!(lines[1], "env            300          12");
        assert_eq!(lines[2], "document       100           3");
    }

    #[test]
    fn json_resolved_omits_missing_match() {
        let out = JsonFormatter
            .format_resolved(&Resolved {
                key: "a".into(),
                value: "1".into(),
                origin: "default".into(),
                matched: None,
            })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["origin"], "default");
        assert!(parsed.get("matched").is_none());
    }
}
