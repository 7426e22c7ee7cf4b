//! Architecture tests for crate layering and source hygiene.
//!
//! Enforces:
//! - Every source file under `crates/*/src` opens with a `//!` module doc.
//! - The `gluon-config` library does not depend on CLI-only crates.
//! - Library code outside `#[cfg(test)]` never calls `.unwrap()` or `.expect(`.
//!
//! # What This Test Does NOT Do
//!
//! - It does NOT parse Rust; checks are line-based and skip comment lines.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Crates the library must not import.
const CLI_ONLY_CRATES: &[&str] = &["clap", "anyhow", "tracing_subscriber", "directories"];

#[test]
fn every_source_file_has_module_docs() {
    let crates_dir = find_workspace_root().join("crates");
    let mut missing = Vec::new();

    for file in rust_files(&crates_dir).filter(|p| p.components().any(|c| c.as_os_str() == "src")) {
        let content = fs::read_to_string(&file).expect("Failed to read file");
        let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        if !first.starts_with("//!") {
            missing.push(file);
        }
    }

    assert!(
        missing.is_empty(),
        "Files without a leading //! module doc:\n{:#?}",
        missing
    );
}

#[test]
fn library_does_not_import_cli_crates() {
    let src = find_workspace_root().join("crates/config/src");
    let mut violations = Vec::new();

    for file in rust_files(&src) {
        let content = fs::read_to_string(&file).expect("Failed to read file");
        for (line_no, line) in code_lines(&content) {
            for krate in CLI_ONLY_CRATES {
                if line.contains(&format!("{krate}::")) {
                    violations.push(format!("{}:{}: {}", file.display(), line_no, line.trim()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "gluon-config must stay free of CLI crates:\n{}",
        violations.join("\n")
    );
}

#[test]
fn library_code_does_not_panic_on_errors() {
    let src = find_workspace_root().join("crates/config/src");
    let mut violations = Vec::new();

    for file in rust_files(&src) {
        let content = fs::read_to_string(&file).expect("Failed to read file");
        for (line_no, line) in code_lines(&content) {
            if line.contains(".unwrap()") || line.contains(".expect(") {
                violations.push(format!("{}:{}: {}", file.display(), line_no, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Library code must propagate errors instead of panicking:\n{}",
        violations.join("\n")
    );
}

/// Non-comment lines before the first `#[cfg(test)]`, with 1-based numbers.
fn code_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(i, line)| (i + 1, line))
}

/// All .rs files below `dir`, skipping build output.
fn rust_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != "target")
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|x| x == "rs"))
        .map(|e| e.into_path())
}

/// Find the workspace root by looking for Cargo.toml with [workspace].
fn find_workspace_root() -> PathBuf {
    let current_dir = std::env::current_dir().expect("Failed to get current directory");

    let mut dir = current_dir.as_path();
    loop {
        let cargo_toml = dir.join("Cargo.toml");
        if cargo_toml.exists()
            && let Ok(content) = fs::read_to_string(&cargo_toml)
            && content.contains("[workspace]")
        {
            return dir.to_path_buf();
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => return current_dir,
        }
    }
}
