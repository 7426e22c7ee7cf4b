//! Document-as-flat-source.
//!
//! Flattens the raw YAML document into `dotted.key[index] -> value` pairs so
//! it can be queried like the environment and flags. Profile sections are
//! flattened as-is (`+dev.app.db.user`), so profile-qualified lookups reach
//! them without a separate merge step.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::Source;
use crate::constants::{DOCUMENT_FILE_NAME, DOCUMENT_PRIORITY};
use crate::document::{discover_document, parse_document, read_document};
use crate::error::ConfigError;
use crate::flatten::flatten;
use crate::value::ValueMap;

#[derive(Debug, Clone)]
enum Origin {
    Dir { root: PathBuf, file_name: String },
    File(PathBuf),
    Text(String),
    Parsed(ValueMap),
}

/// Configuration source over a flattened YAML document.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    origin: Origin,
    data: BTreeMap<String, String>,
    priority: i32,
}

impl DocumentSource {
    fn with_origin(origin: Origin) -> Self {
        Self {
            origin,
            data: BTreeMap::new(),
            priority: DOCUMENT_PRIORITY,
        }
    }

    /// Search `root` for `application.yaml` at `init`.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::with_origin(Origin::Dir {
            root: root.into(),
            file_name: DOCUMENT_FILE_NAME.to_string(),
        })
    }

    /// Read the document at `path` at `init`.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::with_origin(Origin::File(path.into()))
    }

    /// Parse `text` at `init`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_origin(Origin::Text(text.into()))
    }

    /// Flatten an already-parsed document.
    pub fn from_map(document: ValueMap) -> Self {
        Self::with_origin(Origin::Parsed(document))
    }

    /// Override the file name searched by `from_dir`.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        if let Origin::Dir { file_name, .. } = &mut self.origin {
            *file_name = name.into();
        }
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Source for DocumentSource {
    fn init(&mut self) -> Result<(), ConfigError> {
        let document = match &self.origin {
            Origin::Dir { root, file_name } => read_document(&discover_document(root, file_name)?)?,
            Origin::File(path) => read_document(path)?,
            Origin::Text(text) => parse_document(text, "inline document")?,
            Origin::Parsed(document) => document.clone(),
        };
        self.data = flatten(&document);
        tracing::debug!(properties = self.data.len(), "Flattened configuration document");
        Ok(())
    }

    fn name(&self) -> &str {
        "document"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn property(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.data.get(key).cloned())
    }

    fn properties(&self) -> BTreeMap<String, String> {
        self.data.clone()
    }
}
