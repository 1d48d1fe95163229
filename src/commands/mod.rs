//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File        | Invocation                  | Description                  |
//! |-------------|-----------------------------|------------------------------|
//! | `run.rs`    | `vaultic do`                | Run an action against rules  |
//! | `show.rs`   | `vaultic show`              | Describe an action           |
//! | `locate.rs` | `vaultic locate`            | Print where a name resolves  |
//! | `create.rs` | `vaultic create-action` / `vaultic create-rule` | Scaffolds |
//! | `list.rs`   | `--list-actions` / `--list-rules` / `--paths`   | Listings  |
//!
//! The helpers below are shared by the handlers: action and rule arguments
//! may be either names (searched for under the roots) or literal paths,
//! and both forms reduce to a path plus a logical name.

pub mod create;
pub mod list;
pub mod locate;
pub mod run;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use vaultic::paths;

/// An argument is a literal path when it contains a separator or carries
/// the file extension for its kind; everything else is a name to search
/// for.
pub(crate) fn is_explicit_path(arg: &str, ext: &str) -> bool {
    arg.contains('/') || Path::new(arg).extension().is_some_and(|e| e == ext)
}

/// Resolve an action argument to a script path.
pub(crate) fn resolve_action(arg: &str) -> Result<PathBuf> {
    if is_explicit_path(arg, paths::ACTION_EXT) {
        let path = PathBuf::from(arg);
        if !path.is_file() {
            bail!("action script not found: {}", path.display());
        }
        return Ok(path);
    }
    paths::find_action(arg)
        .with_context(|| format!("no action named '{arg}' found under the search roots"))
}

/// Resolve a rule argument to a file path, if one exists.
pub(crate) fn resolve_rule(arg: &str) -> Option<PathBuf> {
    if is_explicit_path(arg, paths::RULE_EXT) {
        let path = PathBuf::from(arg);
        return path.is_file().then_some(path);
    }
    paths::find_rule(arg)
}

/// The logical name of an action argument.  Explicit paths are known by
/// their file stem, so properties for `/opt/scripts/copy.rhai` still live
/// under `[copy]`.
pub(crate) fn action_name(arg: &str) -> String {
    stem_of(arg, paths::ACTION_EXT)
}

/// The display label of a rule argument, by the same stem treatment.
pub(crate) fn rule_label(arg: &str) -> String {
    stem_of(arg, paths::RULE_EXT)
}

fn stem_of(arg: &str, ext: &str) -> String {
    if is_explicit_path(arg, ext) {
        Path::new(arg)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| arg.to_string())
    } else {
        arg.to_string()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
