//! Structured document loading.
//!
//! Responsibilities:
//! - Locate the configuration document inside a directory tree.
//! - Parse YAML text into a `ValueMap`.
//!
//! Does NOT handle:
//! - Profile overlays (see `merge.rs`).
//! - Flattening for flat lookups (see `flatten.rs`).
//!
//! Invariants:
//! - Discovery walks in file-name order; the first file with the wanted name wins.
//! - The document root must be a mapping; an empty document is an empty mapping.
//! - `null` mapping entries are dropped; `null` list items become empty strings
//!   so list indices stay stable.
//! - Non-string mapping keys are stringified.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ConfigError;
use crate::value::{Value, ValueMap};

/// Find the first file named `file_name` under `root`.
pub fn discover_document(root: &Path, file_name: &str) -> Result<PathBuf, ConfigError> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ConfigError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.file_name() == file_name {
            tracing::debug!(path = %entry.path().display(), "Found configuration document");
            return Ok(entry.into_path());
        }
    }

    Err(ConfigError::DocumentNotFound {
        file_name: file_name.to_string(),
        root: root.to_path_buf(),
    })
}

/// Read and parse the document at `path`.
pub fn read_document(path: &Path) -> Result<ValueMap, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text, &path.display().to_string())
}

/// Parse YAML text into a mapping. `origin` names the text in errors.
pub fn parse_document(text: &str, origin: &str) -> Result<ValueMap, ConfigError> {
    let raw: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|source| ConfigError::DocumentParse {
            origin: origin.to_string(),
            source,
        })?;

    match raw {
        serde_yaml::Value::Null => Ok(ValueMap::new()),
        serde_yaml::Value::Mapping(mapping) => Ok(convert_mapping(mapping)),
        serde_yaml::Value::Tagged(tagged) => match tagged.value {
            serde_yaml::Value::Mapping(mapping) => Ok(convert_mapping(mapping)),
            _ => Err(ConfigError::DocumentNotMapping {
                origin: origin.to_string(),
            }),
        },
        _ => Err(ConfigError::DocumentNotMapping {
            origin: origin.to_string(),
        }),
    }
}

fn convert_mapping(mapping: serde_yaml::Mapping) -> ValueMap {
    let mut map = ValueMap::new();
    for (key, value) in mapping {
        let Some(key) = key_to_string(key) else {
            tracing::debug!("Skipping document entry with a non-scalar key");
            continue;
        };
        if let Some(value) = convert(value) {
            map.insert(key, value);
        }
    }
    map
}

fn convert(value: serde_yaml::Value) -> Option<Value> {
    match value {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::Bool(b) => Some(Value::Bool(b)),
        serde_yaml::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        serde_yaml::Value::String(s) => Some(Value::String(s)),
        serde_yaml::Value::Sequence(items) => Some(Value::List(
            items
                .into_iter()
                .map(|item| convert(item).unwrap_or_else(|| Value::String(String::new())))
                .collect(),
        )),
        serde_yaml::Value::Mapping(mapping) => Some(Value::Map(convert_mapping(mapping))),
        serde_yaml::Value::Tagged(tagged) => convert(tagged.value),
    }
}

fn key_to_string(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DOCUMENT_FILE_NAME;
    use tempfile::TempDir;

    #[test]
    fn parses_scalars_lists_and_maps() {
        let doc = parse_document(
            "s: text\ni: 42\nf: 1.5\nb: true\nl: [1, x]\nm:\n  k: v\n",
            "inline",
        )
        .unwrap();
        assert_eq!(doc["s"], Value::from("text"));
        assert_eq!(doc["i"], Value::Int(42));
        assert_eq!(doc["f"], Value::Float(1.5));
        assert_eq!(doc["b"], Value::Bool(true));
        assert_eq!(
            doc["l"],
            Value::List(vec![Value::Int(1), Value::from("x")])
        );
        assert_eq!(doc["m"].as_map().unwrap()["k"], Value::from("v"));
    }

    #[test]
    fn nulls_and_non_string_keys() {
        let doc = parse_document("gone:\nl: [a, ~, c]\n1: one\ntrue: yes\n", "inline").unwrap();
        assert!(!doc.contains_key("gone"));
        assert_eq!(doc["l"].as_list().unwrap()[1], Value::from(""));
        assert_eq!(doc["1"], Value::from("one"));
        assert_eq!(doc["true"], Value::from("yes"));
    }

    #[test]
    fn empty_document_is_empty_map() {
        assert!(parse_document("", "inline").unwrap().is_empty());
        assert!(parse_document("# only a comment\n", "inline").unwrap().is_empty());
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        assert!(matches!(
            parse_document("- a\n- b\n", "inline"),
            Err(ConfigError::DocumentNotMapping { .. })
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_document("a: [unclosed\n", "broken.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::DocumentParse { ref origin, .. } if origin == "broken.yaml"));
    }

    #[test]
    fn discovers_document_in_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("resources").join("config");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(DOCUMENT_FILE_NAME), "a: 1\n").unwrap();
        std::fs::write(temp_dir.path().join("other.yaml"), "b: 2\n").unwrap();

        let found = discover_document(temp_dir.path(), DOCUMENT_FILE_NAME).unwrap();
        assert_eq!(found, nested.join(DOCUMENT_FILE_NAME));
        assert_eq!(read_document(&found).unwrap()["a"], Value::Int(1));
    }

    #[test]
    fn missing_document_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let err = discover_document(temp_dir.path(), DOCUMENT_FILE_NAME).unwrap_err();
        assert!(matches!(err, ConfigError::DocumentNotFound { .. }));
    }

    #[test]
    fn unreadable_document_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.yaml");
        let err = read_document(&path).unwrap_err();
        match &err {
            ConfigError::DocumentRead { path: reported, source } => {
                assert_eq!(reported, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected DocumentRead, got {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }
}
