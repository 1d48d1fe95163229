//! vaultic: extensible backups driven by script actions and rule files.
//!
//! An *action* is a script that knows how to perform one kind of backup
//! work and declares the properties it needs.  A *rule* is a document
//! that supplies values for those properties.  Running a backup means
//! loading an action, binding it to a rule, and calling its entry point.
//!
//! # Module map
//!
//! | Module     | Responsibility                                      |
//! |------------|-----------------------------------------------------|
//! | `loader`   | compile and proxy script modules                    |
//! | `action`   | action discovery, descriptors, execution            |
//! | `document` | slash-path lookups over parsed rule documents       |
//! | `rule`     | rule files: formats, sections, tolerant lookups     |
//! | `property` | the value taxonomy and manifest resolution          |
//! | `paths`    | search roots and file discovery                     |
//! | `template` | skeletons for newly created actions and rules       |

pub mod action;
pub mod document;
pub mod loader;
pub mod paths;
pub mod property;
pub mod rule;
pub mod template;

pub use action::{ACTION_PREFIX, Action, ActionError, LoadedAction, ScriptAction, load_action};
pub use document::DocTree;
pub use loader::{LoadError, ModuleProxy, load_module, load_module_with};
pub use property::{
    ActionProperty, ActionPropertyMapping, PropertyError, PropertyType, PropertyValue,
    resolve_properties,
};
pub use rule::{GLOBAL_SECTION, Rule, RuleError, RuleMode};
pub use template::{TemplateError, action_skeleton, rule_skeleton, write_action_file, write_rule_file};
