//! Flat configuration sources.
//!
//! Responsibilities:
//! - Define the `Source` trait: a named, prioritized lookup of raw strings by key.
//! - Provide the built-in environment, flags, document and in-memory sources.
//!
//! Does NOT handle:
//! - Ordering between sources (see `registry.rs`).
//! - Profile qualification of keys (the provider asks for both spellings).
//!
//! Invariants:
//! - A source is immutable after `init`; `property` never changes observable state.
//! - Each source translates the dotted key into its own spelling (`env_name`,
//!   `flag_name`, or verbatim).

mod document;
mod env;
mod flags;
mod map;

use std::collections::BTreeMap;

use crate::error::ConfigError;

pub use document::DocumentSource;
pub use env::EnvSource;
pub use flags::{FlagsSource, parse_flags};
pub use map::MapSource;

/// A named, prioritized provider of raw string values.
pub trait Source: Send + Sync {
    /// Load backing data. Called once, before the source is queried.
    fn init(&mut self) -> Result<(), ConfigError>;

    /// Name of the source for diagnostics.
    fn name(&self) -> &str;

    /// Higher priorities are consulted first.
    fn priority(&self) -> i32;

    /// Raw value for a fully-qualified dotted key, or `None` when absent.
    fn property(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Every property the source holds, in the source's own key spelling.
    fn properties(&self) -> BTreeMap<String, String>;
}
