//! Error types for configuration resolution.
//!
//! Responsibilities:
//! - Define error variants for fatal initialization failures (document, flags, dotenv).
//! - Define the typed contract violations raised by tree accessors and overlays.
//!
//! Does NOT handle:
//! - Coercion failures of raw source values; those fall through silently
//!   to the next resolution step and are only logged.
//!
//! Invariants:
//! - All error variants include context for debugging (keys, paths, origins).
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration document '{file_name}' not found under {root}")]
    DocumentNotFound { file_name: String, root: PathBuf },

    #[error("Failed to read configuration document at {path}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration document {origin}")]
    DocumentParse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration document {origin} must contain a mapping at its root")]
    DocumentNotMapping { origin: String },

    #[error("Failed to search for configuration document under {root}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("bad flag syntax: {0}")]
    BadFlagSyntax(String),

    #[error("Invalid property key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    #[error("Profile overlay conflict at '{path}': cannot merge {overlay} onto {base}")]
    OverlayConflict {
        path: String,
        overlay: &'static str,
        base: &'static str,
    },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Configuration source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    pub(crate) fn invalid_key(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidKey {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
