//! Property keys and their source-specific spellings.
//!
//! Responsibilities:
//! - Parse dotted keys (`app.db.second[1].data`) into path segments.
//! - Derive the environment variable and flag names for a key.
//! - Build profile-qualified keys (`+dev.app.db.user`).
//!
//! Invariants:
//! - `env_name` is deterministic and idempotent on its own output.
//! - Keys are case-sensitive; only `env_name` folds case.

use std::fmt;
use std::str::FromStr;

use crate::constants::PROFILE_MARKER;
use crate::error::ConfigError;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Mapping key.
    Key(String),
    /// Position inside a sequence.
    Index(usize),
}

/// A parsed dotted property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyKey {
    segments: Vec<Segment>,
}

impl PropertyKey {
    /// Parse a dotted key such as `app.db.list[1]`.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::invalid_key(key, "key is empty"));
        }

        let mut segments = Vec::new();
        for part in key.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };
            if name.is_empty() {
                return Err(ConfigError::invalid_key(key, "empty path segment"));
            }
            segments.push(Segment::Key(name.to_string()));

            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| ConfigError::invalid_key(key, "unterminated index"))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| ConfigError::invalid_key(key, "index must be a number"))?;
                segments.push(Segment::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(ConfigError::invalid_key(
                        key,
                        "unexpected characters after index",
                    ));
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append the segments of `other`, producing an absolute key.
    pub fn join(&self, other: &PropertyKey) -> PropertyKey {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        PropertyKey { segments }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(name) if i == 0 => f.write_str(name)?,
                Segment::Key(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for PropertyKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Join a prefix and a leaf with `.`; an empty prefix yields the leaf alone.
pub fn join_path(prefix: &str, leaf: &str) -> String {
    if prefix.is_empty() {
        leaf.to_string()
    } else {
        format!("{prefix}.{leaf}")
    }
}

/// Environment variable name for a key: runs of non-alphanumeric characters
/// collapse to `_`, the rest is upper-cased.
pub fn env_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_run = false;
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Flag name for a key: dots become hyphens.
pub fn flag_name(key: &str) -> String {
    key.replace('.', "-")
}

/// Profile-qualified spelling of a key.
pub fn qualify(profile: &str, key: &str) -> String {
    format!("{PROFILE_MARKER}{profile}.{key}")
}

/// Name of the document sub-tree holding a profile overlay.
pub fn profile_section(profile: &str) -> String {
    format!("{PROFILE_MARKER}{profile}")
}
