//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! handed to the command handlers.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "vaultic",
    about   = "Extensible backups driven by script actions and rule files",
    version,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Subcommand to run.  Omit (with no listing flag) to print help.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// List available actions under each search root and exit.
    #[arg(long)]
    pub list_actions: bool,

    /// List available rules under each search root and exit.
    #[arg(long)]
    pub list_rules: bool,

    /// Print the search roots and where new files land, then exit.
    #[arg(long)]
    pub paths: bool,
}

/// Explicit subcommands.
#[derive(clap::Subcommand, Debug, PartialEq)]
pub enum Subcommand {
    /// Run an action against one or more rules.
    ///
    /// The action is looked up by name under the search roots, or taken
    /// as a script path when the argument points at a file.  Each rule is
    /// run independently: a rule that cannot be found is recorded as a
    /// failure and the remaining rules still run.
    Do {
        /// Action name, or a path to an action script.
        action: String,

        /// Rule names (or paths to rule files), run in order.
        #[arg(required = true)]
        rules: Vec<String>,
    },

    /// Show an action's documentation and property manifest.
    Show {
        /// Action name, or a path to an action script.
        action: String,
    },

    /// Print where a name resolves under the search roots.
    ///
    /// Looks for an action by default; pass --rule to look for a rule
    /// file instead.  Exits with an error when nothing matches, so shell
    /// scripts can test for presence.
    Locate {
        /// Name of an action (or, with --rule, a rule).
        name: String,

        /// Locate a rule file instead of an action script.
        #[arg(long, short)]
        rule: bool,
    },

    /// Scaffold a new action script.
    ///
    /// The generated script is immediately runnable: it carries a
    /// descriptor with one optional property and a `run` that prints a
    /// greeting.  Exits with an error if the target file already exists.
    CreateAction {
        /// Name of the new action.
        name: String,

        /// Write to this path instead of the default data path.
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Scaffold a new rule file.
    ///
    /// The generated rule parses cleanly and contains one placeholder
    /// section.  Exits with an error if the target file already exists.
    CreateRule {
        /// Name of the new rule.
        name: String,

        /// Write to this path instead of the default data path.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

// ─── Tests ────────────────────────────────────────────────────────────────────
