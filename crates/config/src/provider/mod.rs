//! The configuration provider.
//!
//! Responsibilities:
//! - Own the source registry, the active profile, the raw document and the
//!   profile-merged document tree.
//! - Resolve flat named lookups through the sources, profile-qualified key first.
//! - Keep the optional flat document source in step with the loaded document.
//! - Hand out `Node` views over the document tree.
//!
//! Does NOT handle:
//! - Parsing of individual sources (see `source/`).
//! - Record binding (see `bind.rs`, which extends `Provider`).
//!
//! Invariants:
//! - The tree always equals `apply_profile(document, profile)` for the current
//!   document and profile.
//! - With a profile active, `+<profile>.<key>` is looked up across every source
//!   before `<key>` is looked up across every source.
//! - Absent lookup strings are memoised one by one; the memo is cleared
//!   whenever sources, the profile or the document change.
//! - When the document source is enabled, it always flattens the current
//!   document, never a previously loaded one.
//! - The tree is only mutated under its write lock, and only by seeding nodes
//!   or reloads.

mod builder;
mod memo;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

pub use builder::ProviderBuilder;
use memo::MissCache;

use crate::constants::DOCUMENT_FILE_NAME;
use crate::document::{discover_document, parse_document, read_document};
use crate::error::ConfigError;
use crate::flatten::flatten;
use crate::key::{PropertyKey, qualify};
use crate::merge::{MergeMode, apply_profile};
use crate::node::{Node, NodeMode, value_at};
use crate::registry::{Hit, SourceRegistry};
use crate::source::{DocumentSource, Source};
use crate::value::{Scalar, ValueMap};

/// Configuration context: sources, profile and document tree.
#[derive(Debug, Default)]
pub struct Provider {
    registry: SourceRegistry,
    profile: Option<String>,
    document: Option<ValueMap>,
    document_source: bool,
    tree: RwLock<ValueMap>,
    merge_mode: MergeMode,
    misses: MissCache,
}

impl Provider {
    /// Empty provider: no sources, no document, no profile.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ProviderBuilder {
        ProviderBuilder::new()
    }

    /// Provider over the process environment and arguments, with the profile
    /// taken from `gluon.config.profile` if set.
    pub fn from_process() -> Result<Self, ConfigError> {
        ProviderBuilder::new()
            .with_env()
            .with_process_args()
            .build()
    }

    pub fn merge_mode(&self) -> MergeMode {
        self.merge_mode
    }

    /// Change the overlay mode and rebuild the tree with it. On error the
    /// previous mode and tree stay in place.
    pub fn set_merge_mode(&mut self, mode: MergeMode) -> Result<(), ConfigError> {
        if let Some(document) = &self.document {
            let tree = apply_profile(document, self.profile.as_deref(), mode)?;
            *self.write_tree() = tree;
        }
        self.merge_mode = mode;
        self.misses.clear();
        Ok(())
    }

    /// Initialize and register sources.
    pub fn add<I>(&mut self, sources: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = Box<dyn Source>>,
    {
        self.registry.add(sources)?;
        self.misses.clear();
        Ok(())
    }

    /// Initialize and register one source.
    pub fn add_source(&mut self, source: impl Source + 'static) -> Result<(), ConfigError> {
        self.add([Box::new(source) as Box<dyn Source>])
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Active profile name, without the `+` marker.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Activate (or clear, with `None` or `""`) a profile. The document overlay
    /// is re-applied and the miss memo is cleared.
    pub fn set_profile(&mut self, profile: Option<&str>) -> Result<(), ConfigError> {
        let profile = profile.filter(|p| !p.is_empty()).map(str::to_string);
        if let Some(document) = &self.document {
            let tree = apply_profile(document, profile.as_deref(), self.merge_mode)?;
            *self.write_tree() = tree;
        }
        tracing::info!(profile = profile.as_deref().unwrap_or(""), "Configuration profile set");
        self.profile = profile;
        self.misses.clear();
        Ok(())
    }

    /// Whether the loaded document is also registered as a flat source.
    pub fn has_document_source(&self) -> bool {
        self.document_source
    }

    /// Register (or withdraw) the loaded document as a flat source at the
    /// document priority. Later loads replace its contents.
    pub fn set_document_source(&mut self, enabled: bool) -> Result<(), ConfigError> {
        let source = if enabled {
            self.document.clone().map(Self::document_source_for)
        } else {
            None
        };
        self.registry.replace_owned(source)?;
        self.document_source = enabled;
        self.misses.clear();
        Ok(())
    }

    fn document_source_for(document: ValueMap) -> Box<dyn Source> {
        Box::new(DocumentSource::from_map(document))
    }

    /// Replace the document and re-apply the active profile overlay.
    pub fn load_document(&mut self, document: ValueMap) -> Result<(), ConfigError> {
        let tree = apply_profile(&document, self.profile.as_deref(), self.merge_mode)?;
        if self.document_source {
            self.registry
                .replace_owned(Some(Self::document_source_for(document.clone())))?;
        }
        tracing::info!(
            keys = tree.len(),
            profile = self.profile.as_deref().unwrap_or(""),
            "Configuration document loaded"
        );
        self.document = Some(document);
        *self.write_tree() = tree;
        self.misses.clear();
        Ok(())
    }

    pub fn load_document_str(&mut self, text: &str) -> Result<(), ConfigError> {
        self.load_document(parse_document(text, "inline document")?)
    }

    pub fn load_document_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.load_document(read_document(path)?)
    }

    /// Find `application.yaml` under `root`, load it, and return its path.
    pub fn load_document_dir(&mut self, root: &Path) -> Result<PathBuf, ConfigError> {
        let path = discover_document(root, DOCUMENT_FILE_NAME)?;
        self.load_document_file(&path)?;
        Ok(path)
    }

    /// Raw document as loaded, before the profile overlay.
    pub fn document(&self) -> Option<&ValueMap> {
        self.document.as_ref()
    }

    /// Resolve `key` through the sources and report where it came from.
    ///
    /// With a profile active, `+<profile>.<key>` found in any source wins
    /// over `<key>` in every source, whatever their priorities.
    pub fn lookup(&self, key: &str) -> Option<Hit> {
        let qualified = self.profile.as_deref().map(|p| qualify(p, key));
        qualified
            .as_deref()
            .into_iter()
            .chain(std::iter::once(key))
            .find_map(|candidate| self.lookup_exact(candidate))
    }

    fn lookup_exact(&self, key: &str) -> Option<Hit> {
        if self.misses.contains(key) {
            tracing::trace!(key, "Lookup short-circuited by miss memo");
            return None;
        }
        let hit = self.registry.find(key);
        if hit.is_none() {
            self.misses.record(key);
        }
        hit
    }

    /// Raw value of `key` from the sources, if any.
    pub fn find_property(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|hit| hit.value)
    }

    fn property_as<T: Scalar>(&self, key: &str, default: T) -> T {
        match self.find_property(key) {
            Some(raw) => T::parse_raw(&raw).unwrap_or_else(|| {
                tracing::debug!(key, raw = %raw, expected = T::KIND, "Unparsable property, using default");
                default
            }),
            None => default,
        }
    }

    pub fn property(&self, key: &str, default: &str) -> String {
        self.find_property(key)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn property_int(&self, key: &str, default: i64) -> i64 {
        self.property_as(key, default)
    }

    pub fn property_float(&self, key: &str, default: f64) -> f64 {
        self.property_as(key, default)
    }

    pub fn property_bool(&self, key: &str, default: bool) -> bool {
        self.property_as(key, default)
    }

    pub fn property_duration(&self, key: &str, default: Duration) -> Duration {
        self.property_as(key, default)
    }

    pub fn property_time(&self, key: &str, default: DateTime<Utc>) -> DateTime<Utc> {
        self.property_as(key, default)
    }

    /// Read-only view of the document root.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, Vec::new(), NodeMode::ReadOnly)
    }

    /// View of the document root that writes defaults back into the tree.
    pub fn seed(&self) -> Node<'_> {
        Node::new(self, Vec::new(), NodeMode::Seeding)
    }

    /// Read-only view at a dotted path.
    pub fn node(&self, path: &str) -> Node<'_> {
        self.root().map(path)
    }

    pub fn string(&self, path: &str, default: &str) -> Result<String, ConfigError> {
        self.root().string(path, default)
    }

    pub fn int(&self, path: &str, default: i64) -> Result<i64, ConfigError> {
        self.root().int(path, default)
    }

    pub fn float(&self, path: &str, default: f64) -> Result<f64, ConfigError> {
        self.root().float(path, default)
    }

    pub fn bool(&self, path: &str, default: bool) -> Result<bool, ConfigError> {
        self.root().bool(path, default)
    }

    pub fn duration(&self, path: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.root().duration(path, default)
    }

    pub fn time(&self, path: &str, default: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
        self.root().time(path, default)
    }

    /// Copy of the current (profile-merged, possibly seeded) tree.
    pub fn snapshot(&self) -> ValueMap {
        self.read_tree().clone()
    }

    /// The current tree as `dotted.key -> value` pairs.
    pub fn flattened(&self) -> BTreeMap<String, String> {
        flatten(&self.read_tree())
    }

    /// Scalar tree value at a dotted path, rendered as a string.
    pub(crate) fn document_property(&self, path: &str) -> Option<String> {
        let key = PropertyKey::parse(path).ok()?;
        let tree = self.read_tree();
        let value = value_at(&tree, key.segments())?;
        if value.is_scalar() {
            Some(value.to_string())
        } else {
            tracing::debug!(path, kind = value.kind(), "Document value is not a scalar");
            None
        }
    }

    pub(crate) fn read_tree(&self) -> RwLockReadGuard<'_, ValueMap> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_tree(&self) -> RwLockWriteGuard<'_, ValueMap> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn memoized_misses(&self) -> usize {
        self.misses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EnvSource, MapSource};
    use crate::test_util::SAMPLE_DOCUMENT;

    fn provider_with(sources: Vec<Box<dyn Source>>) -> Provider {
        let mut provider = Provider::new();
        provider.add(sources).unwrap();
        provider
    }

    #[test]
    fn provider_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Provider>();
    }

    #[test]
    fn env_lookups_with_and_without_profile() {
        let mut provider = provider_with(vec![Box::new(EnvSource::from_vars([
            ("SIMPLE_ENV", "1234"),
            ("ENV_PROP", "1"),
            ("_TEST_SIMPLE_ENV", "5678"),
        ]))]);

        assert_eq!(provider.property("SIMPLE_ENV", "NO_VALUE"), "1234");
        assert_eq!(provider.property("simple.env", "NO_VALUE"), "1234");
        assert_eq!(provider.property("env.prop", "NO_VALUE"), "1");
        assert_eq!(provider.property("simple.env0", "NO_VALUE"), "NO_VALUE");

        provider.set_profile(Some("test")).unwrap();
        assert_eq!(provider.profile(), Some("test"));
        assert_eq!(provider.property("SIMPLE_ENV", "NO_VALUE"), "5678");
        assert_eq!(provider.property("simple.env", "NO_VALUE"), "5678");
        assert_eq!(provider.property("env.prop", "NO_VALUE"), "1");
    }

    #[test]
    fn priority_300_beats_priority_100() {
        let provider = provider_with(vec![
            Box::new(MapSource::new("doc", 100).with("k", "low")),
            Box::new(MapSource::new("env", 300).with("k", "high")),
        ]);
        assert_eq!(provider.property("k", ""), "high");
        assert_eq!(provider.lookup("k").unwrap().source, "env");
    }

    #[test]
    fn profile_key_preferred_even_when_plain_key_exists() {
        let mut provider = provider_with(vec![Box::new(
            MapSource::new("m", 100)
                .with("app.user", "plain")
                .with("+dev.app.user", "dev"),
        )]);
        assert_eq!(provider.property("app.user", ""), "plain");
        provider.set_profile(Some("dev")).unwrap();
        assert_eq!(provider.property("app.user", ""), "dev");
        provider.set_profile(Some("")).unwrap();
        assert_eq!(provider.profile(), None);
        assert_eq!(provider.property("app.user", ""), "plain");
    }

    #[test]
    fn profile_key_in_low_source_beats_plain_key_in_high_source() {
        let mut provider = provider_with(vec![
            Box::new(MapSource::new("env", 300).with("app.user", "plain-high")),
            Box::new(MapSource::new("doc", 100).with("+dev.app.user", "dev-low")),
        ]);
        assert_eq!(provider.property("app.user", ""), "plain-high");

        provider.set_profile(Some("dev")).unwrap();
        let hit = provider.lookup("app.user").unwrap();
        assert_eq!(hit.value, "dev-low");
        assert_eq!(hit.source, "doc");
        assert_eq!(hit.key, "+dev.app.user");
    }

    #[test]
    fn typed_properties_fall_back_on_parse_failure() {
        let provider = provider_with(vec![Box::new(
            MapSource::new("m", 100)
                .with("n", "42")
                .with("bad", "forty-two")
                .with("f", "1.5")
                .with("b", "true")
                .with("d", "2m"),
        )]);
        assert_eq!(provider.property_int("n", 0), 42);
        assert_eq!(provider.property_int("bad", 7), 7);
        assert_eq!(provider.property_float("f", 0.0), 1.5);
        assert!(provider.property_bool("b", false));
        assert!(!provider.property_bool("bad", false));
        assert_eq!(
            provider.property_duration("d", Duration::ZERO),
            Duration::from_secs(120)
        );
        assert_eq!(provider.property_int("missing", -1), -1);
    }

    #[test]
    fn misses_are_memoised_per_lookup_string() {
        let mut provider = provider_with(vec![Box::new(MapSource::new("m", 100))]);
        provider.set_profile(Some("dev")).unwrap();

        assert_eq!(provider.find_property("absent"), None);
        assert_eq!(provider.memoized_misses(), 2);
        assert_eq!(provider.find_property("absent"), None);
        assert_eq!(provider.memoized_misses(), 2);

        provider.set_profile(Some("prod")).unwrap();
        assert_eq!(provider.memoized_misses(), 0);
    }

    #[test]
    fn qualified_miss_is_memoised_when_plain_key_hits() {
        let mut provider =
            provider_with(vec![Box::new(MapSource::new("m", 100).with("app.user", "plain"))]);
        provider.set_profile(Some("dev")).unwrap();

        assert_eq!(provider.property("app.user", ""), "plain");
        assert_eq!(provider.memoized_misses(), 1);
        assert_eq!(provider.property("app.user", ""), "plain");
        assert_eq!(provider.memoized_misses(), 1);
    }

    #[test]
    fn reload_replaces_document_source_contents() {
        let mut provider = Provider::new();
        provider.set_document_source(true).unwrap();
        provider.load_document_str("a: 1
old: here
").unwrap();
        assert_eq!(provider.property("a", ""), "1");
        assert_eq!(provider.find_property("new"), None);

        provider.load_document_str("a: 2
new: here
").unwrap();
        assert_eq!(provider.sources().len(), 1);
        assert_eq!(provider.property("a", ""), "2");
        assert_eq!(provider.int("a", 0).unwrap(), 2);
        assert_eq!(provider.find_property("old"), None);
        assert_eq!(provider.property("new", ""), "here");

        provider.set_document_source(false).unwrap();
        assert!(provider.sources().is_empty());
        assert_eq!(provider.int("a", 0).unwrap(), 2);
    }

    #[test]
    fn adding_sources_invalidates_memo() {
        let mut provider = provider_with(vec![Box::new(MapSource::new("m", 100))]);
        assert_eq!(provider.find_property("late"), None);

        provider
            .add_source(MapSource::new("late", 50).with("late", "here"))
            .unwrap();
        assert_eq!(provider.find_property("late").as_deref(), Some("here"));
    }

    #[test]
    fn document_tree_follows_profile() {
        let mut provider = Provider::new();
        provider.load_document_str(SAMPLE_DOCUMENT).unwrap();
        assert_eq!(provider.string("app.db.user", "x").unwrap(), "test_user");
        assert_eq!(provider.string("property", "x").unwrap(), "test1");

        provider.set_profile(Some("dev")).unwrap();
        assert_eq!(provider.string("app.db.user", "x").unwrap(), "test_user_dev");
        assert_eq!(provider.string("app.db.password", "x").unwrap(), "test_password");
        assert_eq!(provider.string("property", "x").unwrap(), "test1-dev");

        provider.set_profile(None).unwrap();
        assert_eq!(provider.string("app.db.user", "x").unwrap(), "test_user");
        assert!(provider.document().unwrap().contains_key("+dev"));
        assert!(!provider.snapshot().contains_key("+dev"));
    }

    #[test]
    fn dotted_tree_lookups() {
        let mut provider = Provider::new();
        provider.load_document_str(SAMPLE_DOCUMENT).unwrap();

        assert_eq!(provider.int("int", 0).unwrap(), i64::MIN);
        assert_eq!(provider.float("float", 0.0).unwrap(), 1.34);
        assert_eq!(provider.string("app.db.data.key1.name", "").unwrap(), "n1");
        assert_eq!(provider.int("app.db.second[1].data", 0).unwrap(), 789);
        assert_eq!(
            provider.duration("timeout", Duration::ZERO).unwrap(),
            Duration::from_secs(30)
        );
        assert_eq!(
            provider.time("time", Utc::now()).unwrap().to_rfc3339(),
            "2018-01-09T10:40:47+00:00"
        );
    }

    #[test]
    fn strict_mode_rebuild_can_fail() {
        let mut provider = Provider::new();
        provider
            .load_document_str("a:\n  x: 1\n\"+dev\":\n  a: flat\n")
            .unwrap();
        provider.set_profile(Some("dev")).unwrap();
        assert_eq!(provider.string("a", "").unwrap(), "flat");

        assert!(matches!(
            provider.set_merge_mode(MergeMode::Strict),
            Err(ConfigError::OverlayConflict { .. })
        ));
    }

    #[test]
    fn flattened_reflects_tree() {
        let mut provider = Provider::new();
        provider.load_document_str(SAMPLE_DOCUMENT).unwrap();
        let flat = provider.flattened();
        assert_eq!(flat["app.db.list[0]"], "a");
        assert_eq!(flat["app.db.list[1]"], "b");
        assert!(!flat.keys().any(|k| k.starts_with('+')));
    }
}
