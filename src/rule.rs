//! Rule files and section/option addressing.
//!
//! A *rule* is a structured config file that parameterizes one run of an
//! action.  Lookup keys are split at the first `/` into a section and an
//! option path: `"copy/dest/dir"` addresses option `dest/dir` inside section
//! `copy`, while a leading slash (`"/verbose"`) addresses the global section
//! at the document root.
//!
//! Section and option misses are distinct conditions ([`RuleError`]) so the
//! caller can tell a misspelled action name apart from an unset option.  The
//! `safe` flag on [`Rule::get`] downgrades both to a default substitution.
//!
//! # File format
//!
//! ```toml
//! [copy]
//! dest.dir = "/var/backups"
//! dest.file = "x.tar.gz"
//! ```
//!
//! Formats are dispatched on the file extension; TOML is the only format
//! wired in.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use toml::{Table, Value};

use crate::document::DocTree;

/// Display name for the root-level section addressed by a leading slash.
pub const GLOBAL_SECTION: &str = "/";

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Everything that can go wrong opening or querying a rule file.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule file does not exist.
    #[error("rule file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but its contents do not parse.  All syntax detail is
    /// collapsed into one message string.
    #[error("cannot parse {}: {detail}", .path.display())]
    Parser { path: PathBuf, detail: String },

    /// An in-memory table could not be rendered in the target format.
    #[error("cannot serialize {}: {detail}", .path.display())]
    Serialize { path: PathBuf, detail: String },

    /// The section named in a lookup key is absent from the document.
    #[error("missing section '{0}'")]
    MissingSection(String),

    /// The section exists but the option path under it does not resolve.
    #[error("missing option '{option}' in section '{section}'")]
    MissingOption { section: String, option: String },

    /// The file extension maps to no known rule format.
    #[error("unsupported rule format '{0}'")]
    UnknownFormat(String),

    /// Any other I/O failure, propagated as-is.
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

// ─── Format adapters ──────────────────────────────────────────────────────────

/// A rule file format: text in, table out, and the reverse for write mode.
trait RuleFormat {
    fn parse(&self, text: &str) -> Result<Table, String>;
    fn serialize(&self, table: &Table) -> Result<String, String>;
}

struct TomlFormat;

impl RuleFormat for TomlFormat {
    fn parse(&self, text: &str) -> Result<Table, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    fn serialize(&self, table: &Table) -> Result<String, String> {
        toml::to_string(table).map_err(|e| e.to_string())
    }
}

/// Pick the format adapter for `path` by extension.
fn format_for(path: &Path) -> Result<&'static dyn RuleFormat, RuleError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(&TomlFormat),
        other => Err(RuleError::UnknownFormat(other.unwrap_or("").to_string())),
    }
}

// ─── Rule ─────────────────────────────────────────────────────────────────────

/// Whether a rule was opened on an existing file or created fresh.  Fixed at
/// construction; the two never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    Read,
    Write,
}

/// A rule document bound to its source file.
#[derive(Debug)]
pub struct Rule {
    path: PathBuf,
    mode: RuleMode,
    doc: DocTree,
}

impl Rule {
    /// Open and parse an existing rule file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RuleError> {
        let path = path.into();
        let format = format_for(&path)?;

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RuleError::NotFound(path));
            }
            Err(source) => return Err(RuleError::Io { path, source }),
        };

        let table = format.parse(&text).map_err(|detail| RuleError::Parser {
            path: path.clone(),
            detail,
        })?;

        tracing::debug!(rule = %path.display(), "rule opened");
        Ok(Self {
            path,
            mode: RuleMode::Read,
            doc: DocTree::new(table),
        })
    }

    /// Serialize `table` to a new file at `path` and wrap the same structure
    /// in memory, without re-reading what was written.
    pub fn create(path: impl Into<PathBuf>, table: Table) -> Result<Self, RuleError> {
        let path = path.into();
        let format = format_for(&path)?;

        let text = format.serialize(&table).map_err(|detail| RuleError::Serialize {
            path: path.clone(),
            detail,
        })?;
        fs::write(&path, text).map_err(|source| RuleError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(rule = %path.display(), "rule created");
        Ok(Self {
            path,
            mode: RuleMode::Write,
            doc: DocTree::new(table),
        })
    }

    /// The file this rule was opened on or written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn mode(&self) -> RuleMode {
        self.mode
    }

    /// The parsed document, for callers that want raw path lookups without
    /// section/option semantics.
    pub fn doc(&self) -> &DocTree {
        &self.doc
    }

    /// Raising lookup: resolve `key` or report which half of it is missing.
    ///
    /// The key is split at the first `/`.  A key starting with `/` (empty
    /// section) resolves against the document root; a key with no `/` at all
    /// is treated the same way, as a root-level option of the global section.
    pub fn require(&self, key: &str) -> Result<&Value, RuleError> {
        let (section, option) = match key.find('/') {
            Some(at) => (&key[..at], &key[at + 1..]),
            None => ("", key),
        };

        if section.is_empty() {
            return self.doc.get(option).ok_or_else(|| RuleError::MissingOption {
                section: GLOBAL_SECTION.to_string(),
                option: option.to_string(),
            });
        }

        if !self.doc.contains(section) {
            return Err(RuleError::MissingSection(section.to_string()));
        }
        self.doc
            .get(&format!("{section}/{option}"))
            .ok_or_else(|| RuleError::MissingOption {
                section: section.to_string(),
                option: option.to_string(),
            })
    }

    /// Tolerant lookup.  With `safe` set, both miss conditions substitute
    /// `default` instead of erroring; without it this is [`require`]
    /// (`Ok` is then always `Some`).
    ///
    /// [`require`]: Self::require
    pub fn get<'a>(
        &'a self,
        key: &str,
        default: Option<&'a Value>,
        safe: bool,
    ) -> Result<Option<&'a Value>, RuleError> {
        match self.require(key) {
            Ok(value) => Ok(Some(value)),
            Err(_) if safe => Ok(default),
            Err(e) => Err(e),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
