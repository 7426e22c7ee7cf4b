//! Shared test utilities for gluon CLI integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Write sample documents into temporary directories.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Variables that would map onto the sample document's keys are cleared.

use assert_cmd::Command;
use std::fs;
use std::path::Path;

pub const SAMPLE_DOCUMENT: &str = r#"
property: test1
app:
  db:
    user: test_user
    password: test_password
    list:
      - a
      - b
"+dev":
  property: test1-dev
  app:
    db:
      user: test_user_dev
"#;

/// Returns a hermetic `gluon` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Variables the CLI or the sample document would pick up are cleared.
pub fn gluon_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gluon");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    // Clear potential host leakage
    cmd.env_remove("GLUON_CONFIG_DIR")
        .env_remove("GLUON_CONFIG_FILE")
        .env_remove("GLUON_CONFIG_PROFILE")
        .env_remove("PROPERTY")
        .env_remove("APP_DB_USER")
        .env_remove("APP_DB_PASSWORD")
        .env_remove("_DEV_APP_DB_USER")
        .env_remove("RUST_LOG");

    cmd
}

/// Write `application.yaml` with the sample document under `dir/conf`.
pub fn write_sample(dir: &Path) {
    let conf = dir.join("conf");
    fs::create_dir_all(&conf).unwrap();
    fs::write(conf.join("application.yaml"), SAMPLE_DOCUMENT).unwrap();
}
