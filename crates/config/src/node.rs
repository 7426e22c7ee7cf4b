//! Path-scoped views over the document tree.
//!
//! Responsibilities:
//! - Navigate the profile-merged tree (`map`, `keys`, `size`, `get`).
//! - Provide typed getters with a fixed fallback chain: source override at
//!   the node's full path, then the tree value, then the caller's default.
//! - Provide list and map getters that read only the tree.
//!
//! Invariants:
//! - A node's path is fixed at creation.
//! - `ReadOnly` nodes never mutate the tree; `Seeding` nodes write a default
//!   back when the key is absent; `Detached` nodes always return defaults.
//! - A tree value of the wrong variant is a `ConfigError::TypeMismatch`; a raw
//!   source value that fails to parse falls through silently.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ConfigError;
use crate::key::{PropertyKey, Segment};
use crate::provider::Provider;
use crate::value::{Scalar, Value, ValueMap};

/// How a node treats absent keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMode {
    /// Absent keys yield defaults; the tree is never touched.
    ReadOnly,
    /// Absent keys yield defaults that are also written into the tree.
    Seeding,
    /// Not backed by the tree: every getter returns its default.
    Detached,
}

/// A typed view bound to one path within the document tree.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    provider: &'a Provider,
    path: Vec<Segment>,
    mode: NodeMode,
}

impl<'a> Node<'a> {
    pub(crate) fn new(provider: &'a Provider, path: Vec<Segment>, mode: NodeMode) -> Self {
        Self {
            provider,
            path,
            mode,
        }
    }

    fn detached(&self, path: Vec<Segment>) -> Node<'a> {
        Node::new(self.provider, path, NodeMode::Detached)
    }

    /// Dotted path of this node (empty at the root).
    pub fn path(&self) -> String {
        render(&self.path)
    }

    pub fn mode(&self) -> NodeMode {
        self.mode
    }

    fn absolute(&self, key: &str) -> Result<Vec<Segment>, ConfigError> {
        let mut path = self.path.clone();
        path.extend(PropertyKey::parse(key)?.into_segments());
        Ok(path)
    }

    /// Descend to the mapping at `key`.
    ///
    /// Absent keys give a detached node, or a freshly created empty mapping
    /// when seeding. A key holding a non-mapping value gives a detached node.
    pub fn map(&self, key: &str) -> Node<'a> {
        if self.mode == NodeMode::Detached {
            return self.detached(self.path.clone());
        }
        let path = match self.absolute(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(key, error = %e, "Invalid node key");
                return self.detached(self.path.clone());
            }
        };

        let found = value_at(&self.provider.read_tree(), &path).map(|v| matches!(v, Value::Map(_)));
        match found {
            Some(true) => Node::new(self.provider, path, self.mode),
            Some(false) => {
                tracing::debug!(path = %render(&path), "Node key does not hold a mapping");
                self.detached(path)
            }
            None if self.mode == NodeMode::Seeding => {
                let mut tree = self.provider.write_tree();
                insert_at(&mut tree, &path, Value::Map(ValueMap::new()));
                if matches!(value_at(&tree, &path), Some(Value::Map(_))) {
                    Node::new(self.provider, path, NodeMode::Seeding)
                } else {
                    self.detached(path)
                }
            }
            None => self.detached(path),
        }
    }

    /// Keys of the mapping this node points at.
    pub fn keys(&self) -> Vec<String> {
        if self.mode == NodeMode::Detached {
            return Vec::new();
        }
        map_at(&self.provider.read_tree(), &self.path)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn size(&self) -> usize {
        if self.mode == NodeMode::Detached {
            return 0;
        }
        map_at(&self.provider.read_tree(), &self.path).map_or(0, ValueMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Raw tree value at `key`, without source overrides.
    pub fn get(&self, key: &str) -> Option<Value> {
        if self.mode == NodeMode::Detached {
            return None;
        }
        let path = self.absolute(key).ok()?;
        value_at(&self.provider.read_tree(), &path).cloned()
    }

    /// Copy of the mapping this node points at.
    pub fn to_map(&self) -> ValueMap {
        if self.mode == NodeMode::Detached {
            return ValueMap::new();
        }
        map_at(&self.provider.read_tree(), &self.path)
            .cloned()
            .unwrap_or_default()
    }

    /// Typed read of `key`: source override, then tree value, then `default`.
    pub fn scalar<T: Scalar>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        if self.mode == NodeMode::Detached {
            return Ok(default);
        }
        let path = self.absolute(key)?;
        let full_key = render(&path);

        if let Some(raw) = self.provider.find_property(&full_key) {
            match T::parse_raw(&raw) {
                Some(value) => return Ok(value),
                None => tracing::debug!(
                    key = %full_key,
                    expected = T::KIND,
                    "Ignoring unparsable source override"
                ),
            }
        }

        {
            let tree = self.provider.read_tree();
            if let Some(existing) = value_at(&tree, &path) {
                return T::from_value(existing).ok_or_else(|| ConfigError::TypeMismatch {
                    path: full_key,
                    expected: T::KIND,
                    found: existing.kind(),
                });
            }
        }

        self.write_back(&path, default.clone().into());
        Ok(default)
    }

    pub fn string(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        self.scalar(key, default.to_string())
    }

    pub fn int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.scalar(key, default)
    }

    pub fn float(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.scalar(key, default)
    }

    pub fn bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.scalar(key, default)
    }

    pub fn duration(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.scalar(key, default)
    }

    pub fn time(&self, key: &str, default: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
        self.scalar(key, default)
    }

    /// Sequence at `key` with every item converted to `T`. No source override.
    pub fn list<T: Scalar>(&self, key: &str, default: Vec<T>) -> Result<Vec<T>, ConfigError> {
        if self.mode == NodeMode::Detached {
            return Ok(default);
        }
        let path = self.absolute(key)?;

        {
            let tree = self.provider.read_tree();
            if let Some(existing) = value_at(&tree, &path) {
                let full_key = render(&path);
                let Value::List(items) = existing else {
                    return Err(ConfigError::TypeMismatch {
                        path: full_key,
                        expected: "list",
                        found: existing.kind(),
                    });
                };
                return items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        T::from_value(item).ok_or_else(|| ConfigError::TypeMismatch {
                            path: format!("{full_key}[{i}]"),
                            expected: T::KIND,
                            found: item.kind(),
                        })
                    })
                    .collect();
            }
        }

        self.write_back(
            &path,
            Value::List(default.iter().cloned().map(Into::into).collect()),
        );
        Ok(default)
    }

    pub fn string_list(&self, key: &str, default: Vec<String>) -> Result<Vec<String>, ConfigError> {
        self.list(key, default)
    }

    pub fn int_list(&self, key: &str, default: Vec<i64>) -> Result<Vec<i64>, ConfigError> {
        self.list(key, default)
    }

    pub fn float_list(&self, key: &str, default: Vec<f64>) -> Result<Vec<f64>, ConfigError> {
        self.list(key, default)
    }

    pub fn bool_list(&self, key: &str, default: Vec<bool>) -> Result<Vec<bool>, ConfigError> {
        self.list(key, default)
    }

    /// Mapping at `key` with every value converted to `T`. No source override.
    pub fn entries<T: Scalar>(
        &self,
        key: &str,
        default: BTreeMap<String, T>,
    ) -> Result<BTreeMap<String, T>, ConfigError> {
        if self.mode == NodeMode::Detached {
            return Ok(default);
        }
        let path = self.absolute(key)?;

        {
            let tree = self.provider.read_tree();
            if let Some(existing) = value_at(&tree, &path) {
                let full_key = render(&path);
                let Value::Map(map) = existing else {
                    return Err(ConfigError::TypeMismatch {
                        path: full_key,
                        expected: "map",
                        found: existing.kind(),
                    });
                };
                return map
                    .iter()
                    .map(|(name, item)| {
                        T::from_value(item)
                            .map(|v| (name.clone(), v))
                            .ok_or_else(|| ConfigError::TypeMismatch {
                                path: format!("{full_key}.{name}"),
                                expected: T::KIND,
                                found: item.kind(),
                            })
                    })
                    .collect();
            }
        }

        self.write_back(
            &path,
            Value::Map(
                default
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone().into()))
                    .collect(),
            ),
        );
        Ok(default)
    }

    pub fn string_map(
        &self,
        key: &str,
        default: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, ConfigError> {
        self.entries(key, default)
    }

    pub fn int_map(
        &self,
        key: &str,
        default: BTreeMap<String, i64>,
    ) -> Result<BTreeMap<String, i64>, ConfigError> {
        self.entries(key, default)
    }

    pub fn float_map(
        &self,
        key: &str,
        default: BTreeMap<String, f64>,
    ) -> Result<BTreeMap<String, f64>, ConfigError> {
        self.entries(key, default)
    }

    pub fn bool_map(
        &self,
        key: &str,
        default: BTreeMap<String, bool>,
    ) -> Result<BTreeMap<String, bool>, ConfigError> {
        self.entries(key, default)
    }

    fn write_back(&self, path: &[Segment], value: Value) {
        if self.mode != NodeMode::Seeding {
            return;
        }
        let mut tree = self.provider.write_tree();
        if !insert_at(&mut tree, path, value) {
            tracing::debug!(path = %render(path), "Cannot seed default at path");
        }
    }
}

fn render(path: &[Segment]) -> String {
    PropertyKey::from_segments(path.to_vec()).to_string()
}

/// Value at `path`, or `None` if any step is missing or of the wrong shape.
pub(crate) fn value_at<'t>(root: &'t ValueMap, path: &[Segment]) -> Option<&'t Value> {
    let (first, rest) = path.split_first()?;
    let Segment::Key(key) = first else {
        return None;
    };
    let mut current = root.get(key)?;
    for segment in rest {
        current = match (segment, current) {
            (Segment::Key(key), Value::Map(map)) => map.get(key)?,
            (Segment::Index(index), Value::List(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

fn map_at<'t>(root: &'t ValueMap, path: &[Segment]) -> Option<&'t ValueMap> {
    if path.is_empty() {
        return Some(root);
    }
    value_at(root, path)?.as_map()
}

/// Insert `value` at `path` unless something is already there, creating
/// intermediate mappings. List slots are never created. Returns whether the
/// path now holds a value.
pub(crate) fn insert_at(root: &mut ValueMap, path: &[Segment], value: Value) -> bool {
    match path {
        [Segment::Key(leaf)] => {
            root.entry(leaf.clone()).or_insert(value);
            true
        }
        [Segment::Key(key), rest @ ..] => {
            if !root.contains_key(key) {
                if !matches!(rest.first(), Some(Segment::Key(_))) {
                    return false;
                }
                root.insert(key.clone(), Value::Map(ValueMap::new()));
            }
            match root.get_mut(key) {
                Some(child) => insert_into_value(child, rest, value),
                None => false,
            }
        }
        _ => false,
    }
}

fn insert_into_value(target: &mut Value, path: &[Segment], value: Value) -> bool {
    match (target, path.first()) {
        (Value::Map(map), Some(Segment::Key(_))) => insert_at(map, path, value),
        (Value::List(items), Some(Segment::Index(index))) if path.len() > 1 => {
            match items.get_mut(*index) {
                Some(item) => insert_into_value(item, &path[1..], value),
                None => false,
            }
        }
        _ => false,
    }
}
