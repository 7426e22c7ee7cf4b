//! Negative-lookup memo.
//!
//! Records lookup strings that every source reported absent so repeated
//! lookups skip the sources. Entries are exact strings: `app.db.user` and
//! `+dev.app.db.user` are independent.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct MissCache {
    entries: Mutex<HashSet<String>>,
}

impl MissCache {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub(crate) fn record(&self, key: &str) {
        self.lock().insert(key.to_string());
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
