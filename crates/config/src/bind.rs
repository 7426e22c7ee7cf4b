//! Record binding.
//!
//! Responsibilities:
//! - Let a record declare its fields (`Bindable`) and fill them from the
//!   sources and the document tree.
//! - Compose dotted paths from a prefix and per-field leaf names.
//! - Report which paths were resolved, defaulted, rejected or skipped.
//!
//! Does NOT handle:
//! - Schema validation; a field either parses or keeps its current value.
//!
//! Invariants:
//! - Leaf resolution order: sources (profile-aware), then the scalar tree
//!   value at the same path, then the field's current value.
//! - A value that fails to parse leaves the field untouched and never aborts
//!   the rest of the walk.
//! - Nested records are filled in place; their existing values are defaults.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::constants::NAMESPACE;
use crate::key::join_path;
use crate::provider::Provider;
use crate::value::{parse_bool, parse_duration, parse_timestamp};

/// A record that can be filled from configuration.
///
/// ```
/// use gluon_config::{Bindable, Fields, Provider};
///
/// #[derive(Default)]
/// struct Db {
///     user: String,
///     port: u16,
/// }
///
/// impl Bindable for Db {
///     fn bind(&mut self, fields: &mut Fields<'_>) {
///         fields.value("user", &mut self.user).value("port", &mut self.port);
///     }
/// }
///
/// let mut provider = Provider::new();
/// provider.load_document_str("app:\n  db:\n    user: alice\n").unwrap();
///
/// let mut db = Db { port: 5432, ..Default::default() };
/// provider.bind_prefixed("app.db", &mut db);
/// assert_eq!(db.user, "alice");
/// assert_eq!(db.port, 5432);
/// ```
pub trait Bindable {
    fn bind(&mut self, fields: &mut Fields<'_>);
}

/// A scalar field type that round-trips through a raw string.
pub trait FieldValue: Sized {
    /// Current value rendered the way a source would supply it.
    fn to_property(&self) -> String;

    /// Parse a raw value; `None` means the field is left unchanged.
    fn from_property(raw: &str) -> Option<Self>;
}

impl FieldValue for String {
    fn to_property(&self) -> String {
        self.clone()
    }

    fn from_property(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FieldValue for bool {
    fn to_property(&self) -> String {
        self.to_string()
    }

    fn from_property(raw: &str) -> Option<Self> {
        parse_bool(raw.trim())
    }
}

macro_rules! numeric_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn to_property(&self) -> String {
                    self.to_string()
                }

                fn from_property(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

numeric_field_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl FieldValue for Duration {
    fn to_property(&self) -> String {
        humantime::format_duration(*self).to_string()
    }

    fn from_property(raw: &str) -> Option<Self> {
        parse_duration(raw)
    }
}

impl FieldValue for DateTime<Utc> {
    fn to_property(&self) -> String {
        self.to_rfc3339()
    }

    fn from_property(raw: &str) -> Option<Self> {
        parse_timestamp(raw)
    }
}

/// An empty raw value clears the option.
impl<T: FieldValue> FieldValue for Option<T> {
    fn to_property(&self) -> String {
        self.as_ref().map(T::to_property).unwrap_or_default()
    }

    fn from_property(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return Some(None);
        }
        T::from_property(raw).map(Some)
    }
}

/// Outcome of a bind, by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Paths whose value came from a source or the document tree.
    pub resolved: Vec<String>,
    /// Paths with no value anywhere; the field kept its current value.
    pub defaulted: Vec<String>,
    /// Paths whose value failed to parse; the field kept its current value.
    pub rejected: Vec<String>,
    /// Paths the record declared as unsupported.
    pub skipped: Vec<String>,
}

impl BindReport {
    pub fn is_fully_resolved(&self) -> bool {
        self.defaulted.is_empty() && self.rejected.is_empty()
    }
}

/// Field visitor handed to [`Bindable::bind`].
pub struct Fields<'a> {
    provider: &'a Provider,
    prefix: String,
    report: &'a mut BindReport,
}

impl<'a> Fields<'a> {
    /// Dotted path of the record being bound (empty at the root).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn path(&self, leaf: &str) -> String {
        join_path(&self.prefix, leaf)
    }

    /// Resolve the scalar at `prefix.leaf` into `field`.
    pub fn value<T: FieldValue>(&mut self, leaf: &str, field: &mut T) -> &mut Self {
        let path = self.path(leaf);
        let raw = self
            .provider
            .find_property(&path)
            .or_else(|| self.provider.document_property(&path));

        match raw {
            Some(raw) => match T::from_property(&raw) {
                Some(value) => {
                    *field = value;
                    self.report.resolved.push(path);
                }
                None => {
                    tracing::debug!(path = %path, raw = %raw, "Unparsable value, keeping field");
                    self.report.rejected.push(path);
                }
            },
            None => {
                tracing::trace!(path = %path, default = %field.to_property(), "No value, keeping field");
                self.report.defaulted.push(path);
            }
        }
        self
    }

    /// Bind a nested record under `prefix.leaf`.
    pub fn nested<B: Bindable + ?Sized>(&mut self, leaf: &str, record: &mut B) -> &mut Self {
        let mut fields = Fields {
            provider: self.provider,
            prefix: self.path(leaf),
            report: &mut *self.report,
        };
        record.bind(&mut fields);
        self
    }

    /// Declare a field that cannot be bound.
    pub fn skip(&mut self, leaf: &str, reason: &str) -> &mut Self {
        let path = self.path(leaf);
        tracing::debug!(path = %path, reason, "Skipping unsupported field");
        self.report.skipped.push(path);
        self
    }
}

impl Provider {
    /// Fill `record` from the root of the key space.
    pub fn bind<B: Bindable + ?Sized>(&self, record: &mut B) -> BindReport {
        self.bind_prefixed("", record)
    }

    /// Fill `record` with every field path prefixed by `prefix`.
    pub fn bind_prefixed<B: Bindable + ?Sized>(&self, prefix: &str, record: &mut B) -> BindReport {
        let mut report = BindReport::default();
        let mut fields = Fields {
            provider: self,
            prefix: prefix.to_string(),
            report: &mut report,
        };
        record.bind(&mut fields);
        tracing::debug!(
            prefix,
            resolved = report.resolved.len(),
            defaulted = report.defaulted.len(),
            rejected = report.rejected.len(),
            "Bound configuration record"
        );
        report
    }

    /// Fill an extension's settings from `gluon.<name>`.
    pub fn bind_extension<B: Bindable + ?Sized>(&self, name: &str, record: &mut B) -> BindReport {
        self.bind_prefixed(&join_path(NAMESPACE, name), record)
    }
}
