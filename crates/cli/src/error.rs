//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `ConfigError` variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use gluon_config::ConfigError;

/// Structured exit codes for the gluon CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// The document could not be found, read or parsed.
    DocumentError = 2,

    /// Bad flag syntax, malformed key or conflicting profile overlay.
    InvalidInput = 3,

    /// The requested key is not set anywhere and no default was given.
    NotFound = 4,

    /// A tree value has a different type than requested.
    TypeMismatch = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::DocumentNotFound { .. }
            | ConfigError::DocumentRead { .. }
            | ConfigError::DocumentParse { .. }
            | ConfigError::DocumentNotMapping { .. }
            | ConfigError::Walk { .. } => ExitCode::DocumentError,
            ConfigError::BadFlagSyntax(_)
            | ConfigError::InvalidKey { .. }
            | ConfigError::OverlayConflict { .. } => ExitCode::InvalidInput,
            ConfigError::TypeMismatch { .. } => ExitCode::TypeMismatch,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Marker error for a key that resolved nowhere.
#[derive(Debug)]
pub struct KeyNotFound(pub String);

impl std::fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key '{}' is not set", self.0)
    }
}

impl std::error::Error for KeyNotFound {}

/// Extension trait to extract exit codes from anyhow errors.
pub trait ExitCodeExt {
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(config_err);
            }
            if cause.is::<KeyNotFound>() {
                return ExitCode::NotFound;
            }
        }
        ExitCode::GeneralError
    }
}
