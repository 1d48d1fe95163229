//! Skeleton files for new actions and rules.
//!
//! `vaultic create-action` and `vaultic create-rule` write a starting
//! point rather than an empty file: the action skeleton is a complete,
//! runnable script with a descriptor and one optional property, and the
//! rule skeleton is a parseable document with a placeholder section.
//!
//! Writers refuse to overwrite.  An existing file at the target path is an
//! error, never a silent replacement.

use std::{fs, io, path::{Path, PathBuf}};

use serde::Serialize;
use thiserror::Error;

use crate::rule::{Rule, RuleError};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("refusing to overwrite {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("rendering skeleton: {0}")]
    Render(String),

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Descriptor constants want an identifier, so the action name is mapped
/// to ASCII uppercase with everything else flattened to underscores.
fn const_suffix(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Render a runnable action script for `name`.
pub fn action_skeleton(name: &str) -> String {
    let suffix = const_suffix(name);
    format!(
        r#"// Action: {name}

const ACTION_{suffix} = #{{
    doc: "describe what {name} does",
    properties: [
        #{{ name: "message", "default": "hello from {name}", optional: true, doc: "text to print" }},
    ],
}};

fn run(props) {{
    print(`{name}: ${{props.message}}`);
}}
"#
    )
}

#[derive(Debug, Serialize)]
struct SkeletonSection {
    option: String,
}

#[derive(Debug, Serialize)]
struct SkeletonRule {
    action: SkeletonSection,
}

/// The starter rule document: one placeholder section with one option.
pub fn rule_skeleton() -> Result<toml::Table, TemplateError> {
    let skeleton = SkeletonRule {
        action: SkeletonSection {
            option: "value".to_string(),
        },
    };
    toml::Table::try_from(skeleton).map_err(|e| TemplateError::Render(e.to_string()))
}

fn ensure_fresh(path: &Path) -> Result<(), TemplateError> {
    if path.exists() {
        return Err(TemplateError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| TemplateError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write an action skeleton to `path`, creating parent directories.
pub fn write_action_file(path: impl AsRef<Path>, name: &str) -> Result<PathBuf, TemplateError> {
    let path = path.as_ref();
    ensure_fresh(path)?;
    fs::write(path, action_skeleton(name)).map_err(|e| TemplateError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), action = name, "action skeleton written");
    Ok(path.to_path_buf())
}

/// Write a rule skeleton to `path`, creating parent directories.
pub fn write_rule_file(path: impl AsRef<Path>) -> Result<PathBuf, TemplateError> {
    let path = path.as_ref();
    ensure_fresh(path)?;
    Rule::create(path, rule_skeleton()?)?;
    tracing::debug!(path = %path.display(), "rule skeleton written");
    Ok(path.to_path_buf())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
