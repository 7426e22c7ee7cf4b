//! Ordered source registry.
//!
//! Responsibilities:
//! - Initialize sources and keep them sorted by descending priority.
//! - Query sources in order for one key.
//! - Hold at most one provider-owned source that can be swapped on reload.
//!
//! Invariants:
//! - The list is sorted by priority descending, stable on ties, after every change.
//! - `add` is all-or-nothing: if any source fails `init`, none are registered.
//! - `replace_owned` leaves the previous owned source in place if the new one
//!   fails `init`.
//! - A source that errors on lookup is logged and skipped for that lookup.

use std::cmp::Reverse;

use crate::error::ConfigError;
use crate::source::Source;

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub value: String,
    pub source: String,
    pub key: String,
}

struct Entry {
    source: Box<dyn Source>,
    owned: bool,
}

/// Sources sorted by priority.
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Entry>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|s| (s.name(), s.priority())))
            .finish()
    }
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize and register sources.
    pub fn add<I>(&mut self, sources: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = Box<dyn Source>>,
    {
        let mut ready = Vec::new();
        for mut source in sources {
            source.init()?;
            tracing::debug!(
                source = source.name(),
                priority = source.priority(),
                "Registered configuration source"
            );
            ready.push(Entry {
                source,
                owned: false,
            });
        }
        self.sources.extend(ready);
        self.sort();
        Ok(())
    }

    /// Initialize `source` and put it in the owned slot, dropping the
    /// previously owned source. `None` just empties the slot.
    pub(crate) fn replace_owned(
        &mut self,
        source: Option<Box<dyn Source>>,
    ) -> Result<(), ConfigError> {
        let ready = match source {
            Some(mut source) => {
                source.init()?;
                Some(source)
            }
            None => None,
        };
        self.sources.retain(|e| !e.owned);
        if let Some(source) = ready {
            tracing::debug!(
                source = source.name(),
                priority = source.priority(),
                "Replaced owned configuration source"
            );
            self.sources.push(Entry {
                source,
                owned: true,
            });
            self.sort();
        }
        Ok(())
    }

    fn sort(&mut self) {
        self.sources.sort_by_key(|e| Reverse(e.source.priority()));
    }

    /// Ask each source in priority order for `key`. The first value found wins.
    pub fn find(&self, key: &str) -> Option<Hit> {
        for source in self.iter() {
            match source.property(key) {
                Ok(Some(value)) => {
                    return Some(Hit {
                        value,
                        source: source.name().to_string(),
                        key: key.to_string(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(source = source.name(), key, error = %e, "Source lookup failed");
                }
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        self.sources.iter().map(|e| e.source.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
