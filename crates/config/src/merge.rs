//! Profile overlay merge.
//!
//! Responsibilities:
//! - Recursively merge an overlay mapping onto a base mapping.
//! - Apply the active profile's `+<profile>` sub-tree to a parsed document.
//!
//! Invariants:
//! - Merging the same overlay twice yields the same tree as merging once.
//! - An overlay mapping never lands on a non-mapping base value (`OverlayConflict`).
//! - In `Lenient` mode an overlay scalar or list replaces the base value,
//!   even when the base holds a mapping.
//! - `apply_profile` either succeeds completely or leaves nothing changed.

use crate::constants::PROFILE_MARKER;
use crate::error::ConfigError;
use crate::key::{join_path, profile_section};
use crate::value::{Value, ValueMap};

/// How type-changing overlays are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Last write wins for scalars and lists, even over a mapping.
    #[default]
    Lenient,
    /// Any overlay that changes the shape (scalar, list, map) of a base value fails.
    Strict,
}

#[derive(PartialEq, Eq)]
enum Shape {
    Scalar,
    List,
    Map,
}

fn shape(value: &Value) -> Shape {
    match value {
        Value::List(_) => Shape::List,
        Value::Map(_) => Shape::Map,
        _ => Shape::Scalar,
    }
}

/// Merge `overlay` onto `base`.
///
/// On error `base` may be partially updated; use `apply_profile` for an
/// all-or-nothing merge.
pub fn merge(overlay: &ValueMap, base: &mut ValueMap, mode: MergeMode) -> Result<(), ConfigError> {
    merge_at(overlay, base, mode, "")
}

fn merge_at(
    overlay: &ValueMap,
    base: &mut ValueMap,
    mode: MergeMode,
    path: &str,
) -> Result<(), ConfigError> {
    for (key, value) in overlay {
        let child_path = join_path(path, key);
        match (value, base.get_mut(key)) {
            (_, None) => {
                base.insert(key.clone(), value.clone());
            }
            (Value::Map(nested), Some(Value::Map(existing))) => {
                merge_at(nested, existing, mode, &child_path)?;
            }
            (Value::Map(_), Some(existing)) => {
                return Err(ConfigError::OverlayConflict {
                    path: child_path,
                    overlay: value.kind(),
                    base: existing.kind(),
                });
            }
            (_, Some(existing)) => {
                if mode == MergeMode::Strict && shape(value) != shape(existing) {
                    return Err(ConfigError::OverlayConflict {
                        path: child_path,
                        overlay: value.kind(),
                        base: existing.kind(),
                    });
                }
                *existing = value.clone();
            }
        }
    }
    Ok(())
}

/// Build the effective tree for `profile` from a raw document.
///
/// The `+<profile>` sub-tree (if any) is merged onto the root, then every
/// `+`-prefixed profile section is removed from the result.
pub fn apply_profile(
    document: &ValueMap,
    profile: Option<&str>,
    mode: MergeMode,
) -> Result<ValueMap, ConfigError> {
    let mut tree = document.clone();

    if let Some(profile) = profile {
        let section = profile_section(profile);
        match document.get(&section) {
            Some(Value::Map(overlay)) => {
                merge(overlay, &mut tree, mode)?;
                tracing::debug!(profile, keys = overlay.len(), "Applied profile overlay");
            }
            Some(other) => {
                return Err(ConfigError::OverlayConflict {
                    path: section,
                    overlay: other.kind(),
                    base: "map",
                });
            }
            None => {
                tracing::debug!(profile, "Document has no overlay for profile");
            }
        }
    }

    tree.retain(|key, _| !key.starts_with(PROFILE_MARKER));
    Ok(tree)
}
