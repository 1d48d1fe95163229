//! Search roots and file discovery.
//!
//! Two roots are searched, system first:
//!
//! | Root   | Location                               |
//! |--------|----------------------------------------|
//! | system | `/usr/local/etc/vaultic`               |
//! | user   | `<config dir>/vaultic` (platform dirs) |
//!
//! Actions live under `<root>/actions`, rules under `<root>/rules`.  Files
//! are found by *stem*: `vaultic do copy nightly` looks for
//! `actions/copy.<ext>` and `rules/nightly.<ext>` under each root in
//! order, first hit wins.
//!
//! [`data_path`] picks where newly created files land: the system root
//! when it is writable, the user root otherwise.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    process,
};

/// System-wide root, searched first.
pub const SYSTEM_ROOT: &str = "/usr/local/etc/vaultic";

/// Subdirectory of a root that holds action scripts.
pub const ACTIONS_DIR: &str = "actions";

/// Subdirectory of a root that holds rule files.
pub const RULES_DIR: &str = "rules";

/// Extension of action scripts.
pub const ACTION_EXT: &str = "rhai";

/// Extension of rule files.
pub const RULE_EXT: &str = "toml";

/// Per-user root, derived from the platform config directory.
pub fn user_root() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("vaultic"))
}

/// All search roots, in priority order.
pub fn roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from(SYSTEM_ROOT)];
    if let Some(user) = user_root() {
        roots.push(user);
    }
    roots
}

/// Locate an action script by stem across the search roots.
pub fn find_action(name: &str) -> Option<PathBuf> {
    find_in_roots(ACTIONS_DIR, name)
}

/// Locate a rule file by stem across the search roots.
pub fn find_rule(name: &str) -> Option<PathBuf> {
    find_in_roots(RULES_DIR, name)
}

fn find_in_roots(subdir: &str, stem: &str) -> Option<PathBuf> {
    let found = roots()
        .iter()
        .find_map(|root| find_in_root(root, subdir, stem));
    if let Some(path) = &found {
        tracing::debug!(stem, path = %path.display(), "found under the search roots");
    }
    found
}

/// Files match on stem alone, whatever their extension.  When several
/// extensions share a stem the lexicographically first path wins, so
/// repeated runs agree.
fn find_in_root(root: &Path, subdir: &str, stem: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(root.join(subdir)).ok()?;
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_stem().is_some_and(|s| s == OsStr::new(stem)))
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// What one root contributes to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootListing {
    pub root: PathBuf,
    pub names: Vec<String>,
}

/// Action stems available under each root, in root order.
pub fn list_actions() -> Vec<RootListing> {
    roots()
        .iter()
        .map(|root| root_listing(root, ACTIONS_DIR, Some(ACTION_EXT)))
        .collect()
}

/// Rule stems available under each root, in root order.  Rules list by
/// stem regardless of extension, matching how they are found.
pub fn list_rules() -> Vec<RootListing> {
    roots()
        .iter()
        .map(|root| root_listing(root, RULES_DIR, None))
        .collect()
}

fn root_listing(root: &Path, subdir: &str, ext: Option<&str>) -> RootListing {
    let mut names: Vec<String> = fs::read_dir(root.join(subdir))
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| match ext {
            Some(ext) => path.extension().is_some_and(|e| e == ext),
            None => true,
        })
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names.dedup();
    RootListing {
        root: root.to_path_buf(),
        names,
    }
}

/// Where new actions and rules should be written: the system root if this
/// process can create files there, the user root otherwise.
pub fn data_path() -> PathBuf {
    let system = PathBuf::from(SYSTEM_ROOT);
    let chosen = if writable(&system) {
        system
    } else {
        user_root().unwrap_or(system)
    };
    tracing::debug!(path = %chosen.display(), "data path selected");
    chosen
}

/// Probe by creating and removing a file in the nearest existing
/// ancestor.  Permission bits alone are not trusted; read-only mounts and
/// ACLs only show up when a write is attempted.
fn writable(dir: &Path) -> bool {
    let Some(existing) = dir.ancestors().find(|p| p.exists()) else {
        return false;
    };
    if !existing.is_dir() {
        return false;
    }
    let probe = existing.join(format!(".vaultic-probe-{}", process::id()));
    match fs::OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
