//! Property manifests and value resolution.
//!
//! Actions declare the properties they need as a *manifest*: a list of
//! [`ActionProperty`] entries, each with a name, a default, an optionality
//! flag, and a doc string.  [`resolve_properties`] binds that manifest
//! against a [`Rule`], scoped under the action's name, and hands back an
//! immutable name→value mapping for the script to consume.
//!
//! Values live in the closed [`PropertyValue`] taxonomy.  The type tag is
//! intrinsic to the variant, so classification never has to be recomputed
//! after an assignment: whatever the value is, [`PropertyValue::property_type`]
//! answers from the tag.
//!
//! # Resolution
//!
//! For a property `dest.dir` of an action `copy`, the lookup key is
//! `copy/dest/dir` (dots become slashes, the action name becomes the
//! section).  Each entry is resolved independently and in declared order:
//!
//! | Rule has the key | Property is optional | Result                        |
//! |------------------|----------------------|-------------------------------|
//! | yes              | either               | the rule's value              |
//! | no               | yes                  | the declared default          |
//! | no               | no                   | [`PropertyError::Undefined`]  |
//!
//! A required property is never satisfied by its declared default; the
//! default exists for the optional case only.
//!
//! # Tagged strings
//!
//! A string of the form `@type path <rest>` converts to a [`PropertyValue::Path`]
//! when it crosses into the property layer, whether it came from a rule file
//! or from a manifest default.  Unknown type words leave the string alone.

use std::{collections::BTreeMap, fmt, ops::Index, path::PathBuf};

use rhai::{Array, Dynamic, ImmutableString, Map};
use thiserror::Error;
use toml::Value;

use crate::rule::Rule;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// A required property had no value after resolution.
    #[error("missing value for required property '{0}'")]
    Undefined(String),

    /// Manifest entries must carry a non-empty name.
    #[error("property name cannot be empty")]
    EmptyName,

    /// A value had the wrong shape for where it appeared, e.g. a descriptor
    /// field of the wrong type.  `key` names the offending location,
    /// including an element index when inside a list.
    #[error("invalid type {found} for '{key}', expected {expected}")]
    Type {
        key: String,
        found: String,
        expected: String,
    },
}

// ─── Value taxonomy ───────────────────────────────────────────────────────────

/// The closed set of property types.  Displays in uppercase (`INT`, `PATH`,
/// ...) for manifest listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    None,
    Bool,
    Int,
    Float,
    String,
    List,
    Dict,
    Path,
    Custom,
}

impl PropertyType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Bool => "BOOL",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::List => "LIST",
            Self::Dict => "DICT",
            Self::Path => "PATH",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A host value outside the closed taxonomy, kept by type name and rendered
/// form (TOML datetimes land here, as does any opaque script value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomValue {
    pub type_name: String,
    pub repr: String,
}

/// A property value.  The variant *is* the classification.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PropertyValue>),
    Dict(BTreeMap<String, PropertyValue>),
    Path(PathBuf),
    Custom(CustomValue),
}

impl PropertyValue {
    pub const fn property_type(&self) -> PropertyType {
        match self {
            Self::None => PropertyType::None,
            Self::Bool(_) => PropertyType::Bool,
            Self::Int(_) => PropertyType::Int,
            Self::Float(_) => PropertyType::Float,
            Self::Str(_) => PropertyType::String,
            Self::List(_) => PropertyType::List,
            Self::Dict(_) => PropertyType::Dict,
            Self::Path(_) => PropertyType::Path,
            Self::Custom(_) => PropertyType::Custom,
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Classify a TOML value.  Strings pass through the tagged-string
    /// filter; datetimes are host-typed and classify as CUSTOM.
    pub fn from_toml(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_tagged_str(s),
            Value::Integer(i) => Self::Int(*i),
            Value::Float(f) => Self::Float(*f),
            Value::Boolean(b) => Self::Bool(*b),
            Value::Datetime(dt) => Self::Custom(CustomValue {
                type_name: "datetime".into(),
                repr: dt.to_string(),
            }),
            Value::Array(items) => Self::List(items.iter().map(Self::from_toml).collect()),
            Value::Table(table) => Self::Dict(
                table
                    .iter()
                    .map(|(key, v)| (key.clone(), Self::from_toml(v)))
                    .collect(),
            ),
        }
    }

    /// Classify a script value.  Booleans are checked before integers, and
    /// the unit value maps to [`PropertyValue::None`].
    pub fn from_dynamic(value: &Dynamic) -> Self {
        if value.is_unit() {
            return Self::None;
        }
        if let Ok(b) = value.as_bool() {
            return Self::Bool(b);
        }
        if let Ok(i) = value.as_int() {
            return Self::Int(i);
        }
        if let Ok(f) = value.as_float() {
            return Self::Float(f);
        }
        if let Some(s) = value.clone().try_cast::<ImmutableString>() {
            return Self::from_tagged_str(&s);
        }
        if let Some(items) = value.clone().try_cast::<Array>() {
            return Self::List(items.iter().map(Self::from_dynamic).collect());
        }
        if let Some(map) = value.clone().try_cast::<Map>() {
            return Self::Dict(
                map.iter()
                    .map(|(key, v)| (key.to_string(), Self::from_dynamic(v)))
                    .collect(),
            );
        }
        Self::Custom(CustomValue {
            type_name: value.type_name().to_string(),
            repr: value.to_string(),
        })
    }

    /// Convert for the script side.  Paths cross over as plain strings
    /// (scripts have no path type); custom values cross as their rendered
    /// form.
    pub fn to_dynamic(&self) -> Dynamic {
        match self {
            Self::None => Dynamic::UNIT,
            Self::Bool(b) => (*b).into(),
            Self::Int(i) => (*i).into(),
            Self::Float(f) => (*f).into(),
            Self::Str(s) => s.clone().into(),
            Self::List(items) => Dynamic::from_array(items.iter().map(Self::to_dynamic).collect()),
            Self::Dict(entries) => {
                let map: Map = entries
                    .iter()
                    .map(|(key, v)| (key.as_str().into(), v.to_dynamic()))
                    .collect();
                Dynamic::from_map(map)
            }
            Self::Path(p) => p.display().to_string().into(),
            Self::Custom(c) => c.repr.clone().into(),
        }
    }

    fn from_tagged_str(text: &str) -> Self {
        parse_tagged(text).unwrap_or_else(|| Self::Str(text.to_string()))
    }
}

/// Parse a `@type <word> <rest>` tagged string.  Only the `path` word is
/// known; the match is case-insensitive and must be followed by whitespace.
/// Returns `None` for anything that is not a well-formed known tag.
pub fn parse_tagged(text: &str) -> Option<PropertyValue> {
    let rest = text.strip_prefix("@type")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut words = rest.trim_start().splitn(2, char::is_whitespace);
    let kind = words.next()?;
    let payload = words.next().unwrap_or("").trim_start();
    if kind.eq_ignore_ascii_case("path") {
        Some(PropertyValue::Path(PathBuf::from(payload)))
    } else {
        None
    }
}

// ─── Manifest entries ─────────────────────────────────────────────────────────

/// One entry of an action's property manifest.  Until resolution the value
/// holds the declared default.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionProperty {
    name: String,
    value: PropertyValue,
    optional: bool,
    doc: String,
}

impl ActionProperty {
    /// A new required property with `default` as its declared default.
    pub fn new(name: impl Into<String>, default: PropertyValue) -> Result<Self, PropertyError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PropertyError::EmptyName);
        }
        Ok(Self {
            name,
            value: default,
            optional: false,
            doc: String::new(),
        })
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn into_value(self) -> PropertyValue {
        self.value
    }

    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Classification of the current value, tag-intrinsic.
    pub const fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }

    /// Reassign the value.  A required property rejects the no-value
    /// sentinel.
    pub fn set_value(&mut self, value: PropertyValue) -> Result<(), PropertyError> {
        if !self.optional && value.is_none() {
            return Err(PropertyError::Undefined(self.name.clone()));
        }
        self.value = value;
        Ok(())
    }
}

// ─── Resolved mapping ─────────────────────────────────────────────────────────

/// Immutable name→value mapping produced by [`resolve_properties`].
///
/// Duplicate manifest names collapse last-write-wins; declaring them is a
/// caveat, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionPropertyMapping {
    entries: BTreeMap<String, PropertyValue>,
}

impl ActionPropertyMapping {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    /// Lookup with a default for absent names.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a PropertyValue) -> &'a PropertyValue {
        self.entries.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The mapping as a script-side object map, keyed by property name.
    pub fn to_rhai_map(&self) -> Map {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str().into(), value.to_dynamic()))
            .collect()
    }
}

impl FromIterator<(String, PropertyValue)> for ActionPropertyMapping {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Raising access: panics when no property has that name.
impl Index<&str> for ActionPropertyMapping {
    type Output = PropertyValue;

    fn index(&self, name: &str) -> &PropertyValue {
        match self.entries.get(name) {
            Some(value) => value,
            None => panic!("no property named '{name}'"),
        }
    }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Bind `manifest` against `rule`, scoped under `action`.
///
/// Entries resolve independently, in declared order, with no visibility
/// into each other's results.  The manifest itself is untouched, so
/// resolving twice against the same rule yields equal mappings.
pub fn resolve_properties(
    action: &str,
    rule: &Rule,
    manifest: &[ActionProperty],
) -> Result<ActionPropertyMapping, PropertyError> {
    tracing::debug!(action, properties = manifest.len(), "resolving properties");

    let mut entries = BTreeMap::new();
    for prop in manifest {
        let key = format!("{action}/{}", prop.name().replace('.', "/"));

        // Tolerant lookup: section and option misses both fall through to
        // the manifest side of the table above.
        let found = rule.get(&key, None, true).ok().flatten();

        let mut bound = prop.clone();
        match found {
            Some(value) => {
                bound.set_value(PropertyValue::from_toml(value))?;
                tracing::debug!(property = prop.name(), %key, "resolved from rule");
            }
            None if bound.is_optional() => {
                tracing::debug!(property = prop.name(), "using declared default");
            }
            None => return Err(PropertyError::Undefined(bound.name().to_string())),
        }

        entries.insert(bound.name().to_string(), bound.into_value());
    }

    Ok(ActionPropertyMapping { entries })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
