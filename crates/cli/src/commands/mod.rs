//! CLI command implementations.

pub mod env_name;
pub mod get;
pub mod keys;
pub mod show;
pub mod sources;
