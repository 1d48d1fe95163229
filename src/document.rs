//! Slash-path access over parsed TOML trees.
//!
//! [`DocTree`] wraps a parsed [`toml::Table`] and adds path-based retrieval:
//! `"copy/dest/dir"` walks `copy` → `dest` → `dir` through nested tables.
//! The tree is immutable after construction and absence is always reported
//! as `None`, never conflated with a present-but-empty value: a key holding
//! an empty table or empty string is found, a key that does not exist is
//! not.

use std::ops::Index;

use toml::{Table, Value};

/// An immutable tree of TOML values addressed by slash-separated paths.
#[derive(Debug, Clone, PartialEq)]
pub struct DocTree {
    root: Table,
}

impl DocTree {
    /// Wrap an already-parsed table.
    pub fn new(root: Table) -> Self {
        Self { root }
    }

    /// The underlying root table.
    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Look up `path`, walking one table level per `/`-separated segment.
    ///
    /// A path without separators is a single root-level lookup.  The walk
    /// aborts with `None` as soon as a non-terminal segment resolves to
    /// anything other than a table.  Segments are matched verbatim, so an
    /// empty segment (`"a//b"`) never matches.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// Like [`get`](Self::get) but substitutes `default` when the path is
    /// absent.  Present-but-empty values are returned as-is, not defaulted.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Whether `path` resolves to any value at all.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }
}

/// Raising access: panics when the path is absent.  Use [`DocTree::get`]
/// when absence is an expected case.
impl Index<&str> for DocTree {
    type Output = Value;

    fn index(&self, path: &str) -> &Value {
        match self.get(path) {
            Some(value) => value,
            None => panic!("no value at '{path}'"),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> DocTree {
        DocTree::new(toml::from_str(text).expect("test fixture must be valid TOML"))
    }

    // ── get ──────────────────────────────────────────────────────────────────

    #[test]
    fn single_segment_lookup() {
        let d = doc(r#"greeting = "hello""#);
        assert_eq!(d.get("greeting").and_then(Value::as_str), Some("hello"));
    }

    #[test]
    fn nested_lookup_matches_manual_walk() {
        let d = doc(
            r#"
            [copy]
            dest.dir = "/var/backups"
            dest.file = "x.tar.gz"
            "#,
        );

        let manual = d
            .root()
            .get("copy")
            .and_then(Value::as_table)
            .and_then(|t| t.get("dest"))
            .and_then(Value::as_table)
            .and_then(|t| t.get("dir"));

        assert_eq!(d.get("copy/dest/dir"), manual);
        assert_eq!(
            d.get("copy/dest/dir").and_then(Value::as_str),
            Some("/var/backups")
        );
    }

    #[test]
    fn absent_path_is_none() {
        let d = doc("[copy]\n");
        assert_eq!(d.get("copy/dest/dir"), None);
        assert_eq!(d.get("paste"), None);
    }

    #[test]
    fn present_but_empty_is_found() {
        // An empty table and an empty string are values, not absences.
        let d = doc(
            r#"
            empty = ""
            [section]
            "#,
        );
        assert!(d.contains("empty"));
        assert!(d.contains("section"));
        assert_eq!(d.get("empty").and_then(Value::as_str), Some(""));
    }

    #[test]
    fn walk_aborts_on_non_table_segment() {
        let d = doc(r#"leaf = "scalar""#);
        assert_eq!(d.get("leaf/deeper"), None);
    }

    #[test]
    fn empty_segment_never_matches() {
        let d = doc("[a]\nb = 1\n");
        assert_eq!(d.get("a//b"), None);
        assert_eq!(d.get(""), None);
    }

    // ── get_or ───────────────────────────────────────────────────────────────

    #[test]
    fn get_or_substitutes_default_only_when_absent() {
        let d = doc("present = 0\n");
        let fallback = Value::Integer(99);

        assert_eq!(d.get_or("present", &fallback), &Value::Integer(0));
        assert_eq!(d.get_or("absent", &fallback), &fallback);
    }

    // ── indexing ─────────────────────────────────────────────────────────────

    #[test]
    fn index_returns_present_value() {
        let d = doc("[copy]\nmode = \"fast\"\n");
        assert_eq!(d["copy/mode"].as_str(), Some("fast"));
    }

    #[test]
    #[should_panic(expected = "no value at 'copy/missing'")]
    fn index_panics_on_absent_path() {
        let d = doc("[copy]\n");
        let _ = &d["copy/missing"];
    }
}
