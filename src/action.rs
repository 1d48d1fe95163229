//! Actions: discovery, loading, and execution.
//!
//! An action is a script module that exports a *descriptor*: a top-level
//! constant whose name starts with [`ACTION_PREFIX`], holding a map of
//! metadata.  The first such member wins; anything else in the file is the
//! action's private business.
//!
//! | Descriptor field | Type   | Meaning                                |
//! |------------------|--------|----------------------------------------|
//! | `doc`            | string | one-line description (optional)        |
//! | `properties`     | array  | property manifest entries (optional)   |
//!
//! Each manifest entry is a map with `name` (required), `default`,
//! `optional`, and `doc`.  The `default` key is written quoted in scripts
//! because the bare word is reserved there.  A minimal action:
//!
//! ```text
//! const ACTION_COPY = #{
//!     doc: "copy a directory tree",
//!     properties: [
//!         #{ name: "source.dir", doc: "tree to copy" },
//!         #{ name: "note", "default": "", optional: true },
//!     ],
//! };
//!
//! fn run(props) {
//!     print(`copying ${props["source.dir"]}`);
//! }
//! ```
//!
//! [`load_action`] parses the descriptor into a [`LoadedAction`];
//! [`LoadedAction::instantiate`] binds it to one rule, resolving the
//! manifest into concrete values; the resulting [`ScriptAction`] runs the
//! script's `run` function, passing the resolved properties when `run`
//! takes a parameter.

use std::path::Path;

use rhai::{Dynamic, ImmutableString, Map};
use thiserror::Error;

use crate::{
    loader::{self, LoadError, ModuleProxy},
    property::{ActionProperty, ActionPropertyMapping, PropertyError, PropertyValue, resolve_properties},
    rule::Rule,
};

/// Member-name prefix that marks a descriptor constant.
pub const ACTION_PREFIX: &str = "ACTION_";

/// Name of the script function an action must define to be runnable.
pub const RUN_ENTRY: &str = "run";

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ActionError {
    /// The file loaded as a script but is not an action.
    #[error("action '{name}' not loaded: {reason}")]
    NotLoaded { name: String, reason: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    /// The action's `run` raised, or cannot be called at all.
    #[error("action '{name}' failed: {detail}")]
    Run { name: String, detail: String },
}

// ─── Descriptor parsing ───────────────────────────────────────────────────────

/// First member whose name carries the descriptor prefix, if any.
fn find_action_member(module: &ModuleProxy) -> Option<String> {
    module
        .members()
        .into_iter()
        .find(|member| member.starts_with(ACTION_PREFIX))
}

fn descriptor_str(key: &str, value: &Dynamic) -> Result<String, PropertyError> {
    value
        .clone()
        .try_cast::<ImmutableString>()
        .map(|s| s.to_string())
        .ok_or_else(|| PropertyError::Type {
            key: key.to_string(),
            found: value.type_name().to_string(),
            expected: "a string".to_string(),
        })
}

fn descriptor_bool(key: &str, value: &Dynamic) -> Result<bool, PropertyError> {
    value.as_bool().map_err(|actual| PropertyError::Type {
        key: key.to_string(),
        found: actual.to_string(),
        expected: "a bool".to_string(),
    })
}

fn parse_manifest_entry(
    member: &str,
    index: usize,
    entry: &Dynamic,
) -> Result<ActionProperty, PropertyError> {
    let location = format!("{member}.properties[{index}]");
    let map = entry
        .clone()
        .try_cast::<Map>()
        .ok_or_else(|| PropertyError::Type {
            key: location.clone(),
            found: entry.type_name().to_string(),
            expected: "a map".to_string(),
        })?;

    let name = match map.get("name") {
        Some(value) => descriptor_str(&format!("{location}.name"), value)?,
        None => return Err(PropertyError::EmptyName),
    };
    let default = map
        .get("default")
        .map(PropertyValue::from_dynamic)
        .unwrap_or(PropertyValue::None);
    let optional = match map.get("optional") {
        Some(value) => descriptor_bool(&format!("{location}.optional"), value)?,
        None => false,
    };
    let doc = match map.get("doc") {
        Some(value) => descriptor_str(&format!("{location}.doc"), value)?,
        None => String::new(),
    };

    Ok(ActionProperty::new(name, default)?
        .optional(optional)
        .with_doc(doc))
}

fn parse_descriptor(
    module: &ModuleProxy,
    member: &str,
) -> Result<(String, Vec<ActionProperty>), ActionError> {
    let value = module.get(member)?;
    let map = value
        .clone()
        .try_cast::<Map>()
        .ok_or_else(|| PropertyError::Type {
            key: member.to_string(),
            found: value.type_name().to_string(),
            expected: "a map".to_string(),
        })?;

    let doc = match map.get("doc") {
        Some(value) => descriptor_str(&format!("{member}.doc"), value)?,
        None => String::new(),
    };

    let mut manifest = Vec::new();
    if let Some(value) = map.get("properties") {
        let entries = value
            .clone()
            .try_cast::<rhai::Array>()
            .ok_or_else(|| PropertyError::Type {
                key: format!("{member}.properties"),
                found: value.type_name().to_string(),
                expected: "an array".to_string(),
            })?;
        for (index, entry) in entries.iter().enumerate() {
            manifest.push(parse_manifest_entry(member, index, entry)?);
        }
    }

    Ok((doc, manifest))
}

// ─── Loaded actions ───────────────────────────────────────────────────────────

/// Load the script at `path` as the action known to the caller as `name`.
///
/// The logical name scopes property lookups later on; it need not match
/// the file name.  A script without a descriptor is rejected with
/// [`ActionError::NotLoaded`].
pub fn load_action(path: impl AsRef<Path>, name: &str) -> Result<LoadedAction, ActionError> {
    let module = loader::load_module(path, name)?;
    let member = find_action_member(&module).ok_or_else(|| ActionError::NotLoaded {
        name: name.to_string(),
        reason: "no action descriptor found".to_string(),
    })?;
    let (doc, manifest) = parse_descriptor(&module, &member)?;

    tracing::debug!(
        action = name,
        member = %member,
        properties = manifest.len(),
        "action loaded"
    );

    Ok(LoadedAction {
        module,
        name: name.to_string(),
        member,
        doc,
        manifest,
    })
}

/// An action whose descriptor has been parsed but whose properties are not
/// yet bound to any rule.
#[derive(Debug)]
pub struct LoadedAction {
    module: ModuleProxy,
    name: String,
    member: String,
    doc: String,
    manifest: Vec<ActionProperty>,
}

impl LoadedAction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        self.module.path()
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn manifest(&self) -> &[ActionProperty] {
        &self.manifest
    }

    /// Bind to `rule`, consuming the loaded action.  Properties resolve
    /// under the section named by the logical name; an unsatisfied
    /// required property aborts the bind.
    pub fn instantiate(self, rule: &Rule) -> Result<ScriptAction, ActionError> {
        let properties = resolve_properties(&self.name, rule, &self.manifest)?;
        Ok(ScriptAction {
            module: self.module,
            name: self.name,
            properties,
        })
    }
}

// ─── Running ──────────────────────────────────────────────────────────────────

/// Something that can perform one bound unit of work.
pub trait Action {
    fn run(&mut self) -> Result<(), ActionError>;
}

/// A script action bound to one rule's property values.
#[derive(Debug)]
pub struct ScriptAction {
    module: ModuleProxy,
    name: String,
    properties: ActionPropertyMapping,
}

impl ScriptAction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &ActionPropertyMapping {
        &self.properties
    }

    /// Drain the script's captured `print`/`debug` output.
    pub fn take_output(&mut self) -> String {
        self.module.take_output()
    }

    fn call_run(&mut self, args: Option<Map>) -> Result<(), ActionError> {
        let outcome = match args {
            Some(props) => self.module.call(RUN_ENTRY, (props,)),
            None => self.module.call(RUN_ENTRY, ()),
        };
        match outcome {
            Ok(_) => Ok(()),
            Err(LoadError::Script { detail, .. }) => Err(ActionError::Run {
                name: self.name.clone(),
                detail,
            }),
            Err(other) => Err(ActionError::Load(other)),
        }
    }
}

impl Action for ScriptAction {
    /// Invoke the script's `run`.  A one-parameter `run` receives the
    /// resolved properties as an object map keyed by property name; a
    /// zero-parameter `run` is called bare.
    fn run(&mut self) -> Result<(), ActionError> {
        if self.module.has_fn(RUN_ENTRY, 1) {
            let props = self.properties.to_rhai_map();
            self.call_run(Some(props))
        } else if self.module.has_fn(RUN_ENTRY, 0) {
            self.call_run(None)
        } else {
            Err(ActionError::Run {
                name: self.name.clone(),
                detail: "script defines no 'run' function".to_string(),
            })
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
