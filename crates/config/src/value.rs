//! Document tree values and typed coercion.
//!
//! Responsibilities:
//! - Define the closed `Value` type held by the document tree.
//! - Convert raw source strings and tree values into requested scalar types
//!   through the `Scalar` trait.
//!
//! Invariants:
//! - The YAML loader only produces `String`, `Int`, `Float`, `Bool`, `List`
//!   and `Map`; `Timestamp` and `Duration` appear when parsed on demand or
//!   when written back by a seeding node.
//! - `Int` widens to `Float`; no other implicit conversion between variants.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Mapping level of the document tree.
pub type ValueMap = BTreeMap<String, Value>;

/// A configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Duration(Duration),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Human-readable variant name used in diagnostics and type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Timestamp(_) => "timestamp",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for everything except lists and maps.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Timestamp(t) => f.write_str(&t.to_rfc3339()),
            Value::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Timestamp(t) => serializer.serialize_str(&t.to_rfc3339()),
            Value::Duration(d) => {
                serializer.serialize_str(&humantime::format_duration(*d).to_string())
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, item) in map {
                    out.serialize_entry(key, item)?;
                }
                out.end()
            }
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

/// A scalar type that typed getters can produce.
pub trait Scalar: Sized + Clone + Into<Value> {
    /// Name used in `TypeMismatch` errors.
    const KIND: &'static str;

    /// Parse a raw string coming from a flat source.
    fn parse_raw(raw: &str) -> Option<Self>;

    /// Convert an existing tree value; `None` means the variant does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

impl Scalar for String {
    const KIND: &'static str = "string";

    fn parse_raw(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl Scalar for i64 {
    const KIND: &'static str = "int";

    fn parse_raw(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl Scalar for f64 {
    const KIND: &'static str = "float";

    fn parse_raw(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl Scalar for bool {
    const KIND: &'static str = "bool";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_bool(raw)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Scalar for Duration {
    const KIND: &'static str = "duration";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_duration(raw)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Duration(d) => Some(*d),
            Value::String(s) => parse_duration(s),
            _ => None,
        }
    }
}

impl Scalar for DateTime<Utc> {
    const KIND: &'static str = "timestamp";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_timestamp(raw)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(*t),
            Value::String(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

/// Boolean spellings accepted from flat sources.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parses human-friendly duration strings (e.g. `30s`, `5m`, `1h30m`).
pub fn parse_duration(raw: &str) -> Option<Duration> {
    humantime::parse_duration(raw.trim()).ok()
}

/// Parses RFC 3339 timestamps plus the common space-separated and date-only
/// spellings. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn int_widens_to_float_but_not_back() {
        assert_eq!(f64::from_value(&Value::Int(3)), Some(3.0));
        assert_eq!(i64::from_value(&Value::Float(3.0)), None);
    }

    #[test]
    fn string_does_not_coerce_to_number() {
        assert_eq!(i64::from_value(&Value::String("12".into())), None);
        assert_eq!(String::from_value(&Value::Int(12)), None);
    }

    #[test]
    fn duration_and_timestamp_parse_from_string_leaves() {
        assert_eq!(
            Duration::from_value(&Value::String("1h30m".into())),
            Some(Duration::from_secs(5400))
        );
        let expected = Utc.with_ymd_and_hms(2018, 1, 9, 10, 40, 47).unwrap();
        for raw in [
            "2018-01-09T10:40:47Z",
            "2018-01-09 10:40:47 +0000",
            "2018-01-09 10:40:47",
        ] {
            assert_eq!(
                DateTime::<Utc>::from_value(&Value::String(raw.into())),
                Some(expected),
                "{raw}"
            );
        }
        assert_eq!(
            parse_timestamp("2018-01-09"),
            Some(Utc.with_ymd_and_hms(2018, 1, 9, 0, 0, 0).unwrap())
        );
        assert_eq!(Duration::from_value(&Value::Int(30)), None);
    }

    #[test]
    fn bool_accepts_short_spellings() {
        assert_eq!(parse_bool("t"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn display_matches_flat_spelling() {
        assert_eq!(Value::Float(1.34).to_string(), "1.34");
        assert_eq!(Value::Int(-5).to_string(), "-5");
        assert_eq!(
            Value::Duration(Duration::from_secs(90)).to_string(),
            "1m 30s"
        );
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a b]");
    }

    #[test]
    fn serializes_as_plain_json() {
        let mut map = ValueMap::new();
        map.insert("user".into(), Value::from("u"));
        map.insert("list".into(), Value::from(vec![1i64, 2]));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"list":[1,2],"user":"u"}"#);
    }
}
