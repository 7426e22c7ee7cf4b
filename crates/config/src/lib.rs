//! Layered configuration resolution for gluon applications.
//!
//! This crate resolves configuration from prioritized sources (environment
//! variables, command-line flags, a flattened YAML document) and from a YAML
//! document tree with an optional profile overlay, and projects the result
//! into typed values or caller-declared records.

pub mod bind;
pub mod constants;
mod document;
mod error;
pub mod flatten;
pub mod key;
pub mod merge;
pub mod node;
mod provider;
mod registry;
pub mod source;
pub mod value;

pub use bind::{BindReport, Bindable, FieldValue, Fields};
pub use document::{discover_document, parse_document, read_document};
pub use error::ConfigError;
pub use merge::MergeMode;
pub use node::{Node, NodeMode};
pub use provider::{Provider, ProviderBuilder};
pub use registry::{Hit, SourceRegistry};
pub use source::{DocumentSource, EnvSource, FlagsSource, MapSource, Source};
pub use value::{Scalar, Value, ValueMap};

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, OnceLock};

    pub fn global_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    pub const SAMPLE_DOCUMENT: &str = r#"
property: test1
int: -9223372036854775808
float: 1.34
time: 2018-01-09T10:40:47Z
timeout: 30s
mapString:
  A: "1"
  B: "2"
app:
  db:
    user: test_user
    password: test_password
    list:
      - a
      - b
    second:
      - data: 456
      - data: 789
    data:
      key1:
        name: n1
        value: 123
      key2:
        name: n2
        value: 456
"+dev":
  property: test1-dev
  app:
    db:
      user: test_user_dev
"+test":
  property: test1-test
"#;
}
