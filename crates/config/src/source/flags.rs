//! Command-line flags source.
//!
//! Responsibilities:
//! - Parse a POSIX-like argument vector once at `init` into a flat map.
//! - Answer lookups by the key's `flag_name` spelling (`app.db.user` -> `app-db-user`).
//!
//! Accepted forms: `--name=value`, `--name value` (the next token is taken
//! unless it is empty or starts with `-`), `-name` in any of those forms, and
//! a bare `--name` which yields an empty value. `--` ends flag parsing, and so
//! does the first token that is not a flag (including a lone `-`).
//!
//! Invariants:
//! - A flag whose name is empty or starts with `-` or `=` fails `init`
//!   with `ConfigError::BadFlagSyntax`.
//! - A repeated flag keeps its last value.

use std::collections::{BTreeMap, HashMap};

use super::Source;
use crate::constants::FLAGS_PRIORITY;
use crate::error::ConfigError;
use crate::key::flag_name;

/// Configuration source backed by command-line flags.
#[derive(Debug, Clone)]
pub struct FlagsSource {
    args: Option<Vec<String>>,
    flags: HashMap<String, String>,
    positional: Vec<String>,
    priority: i32,
}

impl FlagsSource {
    /// Source over the process arguments (without the program name), read at `init`.
    pub fn from_process() -> Self {
        Self {
            args: None,
            flags: HashMap::new(),
            positional: Vec::new(),
            priority: FLAGS_PRIORITY,
        }
    }

    /// Source over an explicit argument vector (without the program name).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: Some(args.into_iter().map(Into::into).collect()),
            flags: HashMap::new(),
            positional: Vec::new(),
            priority: FLAGS_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Arguments left after flag parsing stopped.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }
}

impl Source for FlagsSource {
    fn init(&mut self) -> Result<(), ConfigError> {
        let args = match &self.args {
            Some(args) => args.clone(),
            None => std::env::args().skip(1).collect(),
        };
        let (flags, positional) = parse_flags(&args)?;
        tracing::debug!(
            flags = flags.len(),
            positional = positional.len(),
            "Parsed command-line flags"
        );
        self.flags = flags;
        self.positional = positional;
        Ok(())
    }

    fn name(&self) -> &str {
        "flags"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn property(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.flags.get(&flag_name(key)).cloned())
    }

    fn properties(&self) -> BTreeMap<String, String> {
        self.flags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Split `args` into parsed flags and the remaining positional arguments.
pub fn parse_flags(args: &[String]) -> Result<(HashMap<String, String>, Vec<String>), ConfigError> {
    let mut flags = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let token = &args[i];
        if token.len() < 2 || !token.starts_with('-') {
            break;
        }

        let mut dashes = 1;
        if token.as_bytes()[1] == b'-' {
            dashes = 2;
            if token.len() == 2 {
                i += 1;
                break;
            }
        }

        let body = &token[dashes..];
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(ConfigError::BadFlagSyntax(token.clone()));
        }
        i += 1;

        let (name, value) = match body.find('=') {
            Some(eq) => (&body[..eq], body[eq + 1..].to_string()),
            None => match args.get(i) {
                Some(next) if !next.is_empty() && !next.starts_with('-') => {
                    i += 1;
                    (body, next.clone())
                }
                _ => (body, String::new()),
            },
        };
        flags.insert(name.to_string(), value);
    }

    Ok((flags, args[i..].to_vec()))
}
