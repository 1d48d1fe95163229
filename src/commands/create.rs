//! `vaultic create-action` / `vaultic create-rule`: scaffold new files.
//!
//! Without `--path` the file lands under the data path (system root when
//! writable, user root otherwise), in the `actions/` or `rules/`
//! subdirectory where `do` will find it by name.  An extension on the
//! name is tolerated and stripped, so `create-action copy.rhai` and
//! `create-action copy` mean the same thing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use vaultic::{paths, template};

use crate::ui::icon_ok;

pub fn action(name: &str, path: Option<&PathBuf>) -> Result<()> {
    let stem = strip_ext(name, paths::ACTION_EXT);
    let target = match path {
        Some(p) => p.clone(),
        None => default_target(paths::ACTIONS_DIR, &stem, paths::ACTION_EXT),
    };

    let written = template::write_action_file(&target, &stem)
        .with_context(|| format!("cannot create action '{stem}'"))?;
    announce(&written);
    Ok(())
}

pub fn rule(name: &str, path: Option<&PathBuf>) -> Result<()> {
    let stem = strip_ext(name, paths::RULE_EXT);
    let target = match path {
        Some(p) => p.clone(),
        None => default_target(paths::RULES_DIR, &stem, paths::RULE_EXT),
    };

    let written =
        template::write_rule_file(&target).with_context(|| format!("cannot create rule '{stem}'"))?;
    announce(&written);
    Ok(())
}

fn default_target(subdir: &str, stem: &str, ext: &str) -> PathBuf {
    paths::data_path().join(subdir).join(format!("{stem}.{ext}"))
}

fn strip_ext(name: &str, ext: &str) -> String {
    let suffix = format!(".{ext}");
    name.strip_suffix(suffix.as_str()).unwrap_or(name).to_string()
}

fn announce(path: &std::path::Path) {
    println!("  {}  created {}", icon_ok(), style(path.display()).bold());
}

// ─── Tests ────────────────────────────────────────────────────────────────────
