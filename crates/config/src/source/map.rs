//! In-memory source for programmatic defaults and overrides.

use std::collections::BTreeMap;

use super::Source;
use crate::error::ConfigError;

/// Named source over a fixed map of dotted keys.
#[derive(Debug, Clone)]
pub struct MapSource {
    name: String,
    priority: i32,
    values: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            values: BTreeMap::new(),
        }
    }

    /// Add or replace one property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for MapSource {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.values
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl Source for MapSource {
    fn init(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn property(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }

    fn properties(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}
