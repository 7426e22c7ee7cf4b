//! Centralized constants for the gluon configuration engine.
//!
//! Source priorities, reserved property keys and the document file name live
//! here so the provider, the built-in sources and the CLI agree on them.

// =============================================================================
// Source Priorities
// =============================================================================

/// Priority of the process environment source. Highest of the built-ins.
pub const ENV_PRIORITY: i32 = 300;

/// Priority of the command-line flags source.
pub const FLAGS_PRIORITY: i32 = 200;

/// Priority of the flattened document source. Lowest of the built-ins, so
/// environment and flags override document values.
pub const DOCUMENT_PRIORITY: i32 = 100;

// =============================================================================
// Keys & Names
// =============================================================================

/// Namespace prefix for extension configuration (`gluon.<extension>.<field>`).
pub const NAMESPACE: &str = "gluon";

/// Reserved property that activates a profile when read from the flat sources.
pub const PROFILE_PROPERTY: &str = "gluon.config.profile";

/// Marker that prefixes profile-qualified keys and profile sub-trees (`+dev`).
pub const PROFILE_MARKER: char = '+';

/// Base name of the structured configuration document.
pub const DOCUMENT_FILE_NAME: &str = "application.yaml";

// =============================================================================
// Dotenv
// =============================================================================

/// Environment variable that disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";
