//! Provider builder.
//!
//! Responsibilities:
//! - Collect sources, the document location, the profile and the merge mode.
//! - Optionally load a `.env` file into the process environment first.
//! - Assemble a ready `Provider` in one step.
//!
//! Does NOT handle:
//! - Source parsing (see `source/`).
//! - Overlay semantics (see `merge.rs`).
//!
//! Invariants / Assumptions:
//! - `load_dotenv()` must be called explicitly, and before `with_env()`
//!   sources are initialized, for `.env` values to be visible.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.
//! - An explicit `with_profile` wins over `gluon.config.profile` from the sources.

use std::path::PathBuf;

use super::Provider;
use crate::constants::{DOCUMENT_FILE_NAME, DOTENV_DISABLED_VAR, PROFILE_PROPERTY};
use crate::document::{discover_document, parse_document, read_document};
use crate::error::ConfigError;
use crate::merge::MergeMode;
use crate::source::{EnvSource, FlagsSource, Source};

enum DocumentInput {
    Dir(PathBuf),
    File(PathBuf),
    Text(String),
}

/// Builder for [`Provider`].
pub struct ProviderBuilder {
    sources: Vec<Box<dyn Source>>,
    profile: Option<String>,
    document: Option<DocumentInput>,
    document_source: bool,
    merge_mode: MergeMode,
    file_name: String,
}

impl Default for ProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            profile: None,
            document: None,
            document_source: true,
            merge_mode: MergeMode::default(),
            file_name: DOCUMENT_FILE_NAME.to_string(),
        }
    }

    /// Load environment variables from a `.env` file in the working directory.
    ///
    /// A missing file is not an error. Setting `DOTENV_DISABLED=1` or `true`
    /// skips loading entirely.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn dotenv_disabled() -> bool {
        std::env::var(DOTENV_DISABLED_VAR)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Snapshot the process environment at build time.
    pub fn with_env(self) -> Self {
        self.with_source(Box::new(EnvSource::new()))
    }

    /// Use a fixed set of variables instead of the process environment.
    pub fn with_env_vars<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.with_source(Box::new(EnvSource::from_vars(vars)))
    }

    /// Parse the given arguments (program name excluded) as flags.
    pub fn with_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_source(Box::new(FlagsSource::from_args(args)))
    }

    /// Parse the process arguments as flags.
    pub fn with_process_args(self) -> Self {
        self.with_source(Box::new(FlagsSource::from_process()))
    }

    pub fn with_source(mut self, source: Box<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    /// Activate a profile regardless of `gluon.config.profile`.
    pub fn with_profile(mut self, name: impl Into<String>) -> Self {
        self.profile = Some(name.into());
        self
    }

    /// Search `root` for the document file.
    pub fn with_document_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.document = Some(DocumentInput::Dir(root.into()));
        self
    }

    pub fn with_document_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.document = Some(DocumentInput::File(path.into()));
        self
    }

    pub fn with_document_str(mut self, text: impl Into<String>) -> Self {
        self.document = Some(DocumentInput::Text(text.into()));
        self
    }

    /// File name searched by `with_document_dir` (default `application.yaml`).
    pub fn with_document_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Whether the loaded document is also registered as a flat source
    /// (priority 100). Enabled by default.
    pub fn with_document_source(mut self, enabled: bool) -> Self {
        self.document_source = enabled;
        self
    }

    pub fn with_merge_mode(mut self, mode: MergeMode) -> Self {
        self.merge_mode = mode;
        self
    }

    /// Initialize every source, load the document and activate the profile.
    pub fn build(self) -> Result<Provider, ConfigError> {
        let mut provider = Provider::new();
        provider.set_merge_mode(self.merge_mode)?;
        provider.add(self.sources)?;

        let raw = match self.document {
            Some(DocumentInput::Dir(root)) => {
                let path = discover_document(&root, &self.file_name)?;
                Some(read_document(&path)?)
            }
            Some(DocumentInput::File(path)) => Some(read_document(&path)?),
            Some(DocumentInput::Text(text)) => Some(parse_document(&text, "inline document")?),
            None => None,
        };

        provider.set_document_source(self.document_source)?;
        if let Some(raw) = raw {
            provider.load_document(raw)?;
        }

        let profile = self
            .profile
            .or_else(|| provider.find_property(PROFILE_PROPERTY))
            .filter(|p| !p.trim().is_empty());
        provider.set_profile(profile.as_deref())?;

        tracing::debug!(
            sources = provider.sources().len(),
            profile = provider.profile().unwrap_or(""),
            "Configuration provider built"
        );
        Ok(provider)
    }
}

impl std::fmt::Debug for ProviderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderBuilder")
            .field("sources", &self.sources.len())
            .field("profile", &self.profile)
            .field("document_source", &self.document_source)
            .field("merge_mode", &self.merge_mode)
            .field("file_name", &self.file_name)
            .finish()
    }
}
