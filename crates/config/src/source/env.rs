//! Environment variable source.
//!
//! Responsibilities:
//! - Snapshot the process environment once at `init` (or use injected variables).
//! - Answer lookups by the key's `env_name` spelling (`app.db.user` -> `APP_DB_USER`).
//!
//! Invariants:
//! - The snapshot is never refreshed after `init`.
//! - Every variable is eligible, including empty ones: `APP_DB_USER=` sets
//!   `app.db.user` to `""`.
//! - Variables whose name or value is not valid UTF-8 are ignored.

use std::collections::{BTreeMap, HashMap};

use super::Source;
use crate::constants::ENV_PRIORITY;
use crate::error::ConfigError;
use crate::key::env_name;

/// Configuration source backed by environment variables.
#[derive(Debug, Clone)]
pub struct EnvSource {
    vars: HashMap<String, String>,
    from_process: bool,
    priority: i32,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvSource {
    /// Source that snapshots the process environment at `init`.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            from_process: true,
            priority: ENV_PRIORITY,
        }
    }

    /// Source over an explicit set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            from_process: false,
            priority: ENV_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Source for EnvSource {
    fn init(&mut self) -> Result<(), ConfigError> {
        if self.from_process {
            self.vars = std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect();
            tracing::debug!(count = self.vars.len(), "Captured environment snapshot");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "env"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn property(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.vars.get(&env_name(key)).cloned())
    }

    fn properties(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn looks_up_by_env_spelling() {
        let source = EnvSource::from_vars([
            ("SIMPLE_ENV", "1234"),
            ("ENV_PROP", "1"),
            ("_TEST_SIMPLE_ENV", "5678"),
        ]);

        assert_eq!(source.property("simple.env").unwrap().as_deref(), Some("1234"));
        assert_eq!(source.property("SIMPLE_ENV").unwrap().as_deref(), Some("1234"));
        assert_eq!(source.property("env.prop").unwrap().as_deref(), Some("1"));
        assert_eq!(
            source.property("+test.simple.env").unwrap().as_deref(),
            Some("5678")
        );
        assert_eq!(source.property("simple.env0").unwrap(), None);
    }

    #[test]
    fn empty_values_are_set() {
        let source = EnvSource::from_vars([("BLANK", "   "), ("EMPTY", "")]);
        assert_eq!(source.property("blank").unwrap().as_deref(), Some("   "));
        assert_eq!(source.property("empty").unwrap().as_deref(), Some(""));
        assert_eq!(source.property("missing").unwrap(), None);
    }

    #[test]
    #[serial]
    fn empty_process_variable_is_captured() {
        let _lock = crate::test_util::global_test_lock().lock().unwrap();
        temp_env::with_var("_GLUON_EMPTY_TEST", Some(""), || {
            let mut source = EnvSource::new();
            source.init().unwrap();
            assert_eq!(
                source.property("_gluon.empty.test").unwrap().as_deref(),
                Some("")
            );
        });
    }

    #[test]
    #[serial]
    fn snapshot_is_taken_at_init() {
        let _lock = crate::test_util::global_test_lock().lock().unwrap();
        temp_env::with_vars([("_GLUON_SNAPSHOT_TEST", Some("before"))], || {
            let mut source = EnvSource::new();
            assert_eq!(source.property("_gluon.snapshot.test").unwrap(), None);

            source.init().unwrap();
            assert_eq!(
                source.property("_gluon.snapshot.test").unwrap().as_deref(),
                Some("before")
            );

            temp_env::with_var("_GLUON_SNAPSHOT_TEST", Some("after"), || {
                assert_eq!(
                    source.property("_gluon.snapshot.test").unwrap().as_deref(),
                    Some("before")
                );
            });
        });
    }
}
