//! Get command implementation.
//!
//! Resolution order: sources (profile-aware), then the profile-merged tree,
//! then `--default`.

use anyhow::Result;
use gluon_config::Provider;
use gluon_config::key::PropertyKey;

use crate::error::KeyNotFound;
use crate::formatters::{OutputFormat, Resolved, get_formatter};

pub fn run(provider: &Provider, key: &str, default: Option<&str>, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let resolved = resolve(provider, key, default)?;
    println!("{}", get_formatter(format).format_resolved(&resolved)?);
    Ok(())
}

pub(crate) fn resolve(provider: &Provider, key: &str, default: Option<&str>) -> Result<Resolved> {
    PropertyKey::parse(key)?;

    if let Some(hit) = provider.lookup(key) {
        return Ok(Resolved {
            key: key.to_string(),
            value: hit.value,
            origin: hit.source,
            matched: Some(hit.key),
        });
    }

    if let Some(value) = provider.root().get(key) {
        return Ok(Resolved {
            key: key.to_string(),
            value: value.to_string(),
            origin: "tree".to_string(),
            matched: None,
        });
    }

    match default {
        Some(default) => Ok(Resolved {
            key: key.to_string(),
            value: default.to_string(),
            origin: "default".to_string(),
            matched: None,
        }),
        None => Err(KeyNotFound(key.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExitCode, ExitCodeExt};
    use gluon_config::{MapSource, ProviderBuilder};

    fn provider() -> Provider {
        ProviderBuilder::new()
            .with_source(Box::new(MapSource::new("map", 150).with("+dev.app.name", "dev-app")))
            .with_document_str("app:\n  name: base\n  tags: [a, b]\n")
            .with_document_source(false)
            .with_profile("dev")
            .build()
            .unwrap()
    }

    #[test]
    fn source_hit_reports_matched_spelling() {
        let resolved = resolve(&provider(), "app.name", None).unwrap();
        assert_eq!(resolved.value, "dev-app");
        assert_eq!(resolved.origin, "map");
        assert_eq!(resolved.matched.as_deref(), Some("+dev.app.name"));
    }

    #[test]
    fn falls_back_to_tree_then_default() {
        let provider = provider();
        let tags = resolve(&provider, "app.tags[1]", None).unwrap();
        assert_eq!((tags.value.as_str(), tags.origin.as_str()), ("b", "tree"));

        let fallback = resolve(&provider, "app.port", Some("80")).unwrap();
        assert_eq!((fallback.value.as_str(), fallback.origin.as_str()), ("80", "default"));

        let err = resolve(&provider, "app.port", None).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::NotFound);

        let err = resolve(&provider, "app..port", None).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::InvalidInput);
    }
}
