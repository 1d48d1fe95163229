//! `vaultic`: extensible backups driven by script actions and rule files.
//!
//! # Overview
//!
//! This binary is a thin dispatch layer over the `vaultic` library.  The
//! actual backup knowledge lives in action scripts; rule files say what to
//! apply them to.  Nothing here is specific to any one backup strategy:
//! add a script under an `actions/` directory and it becomes a command.
//!
//! # Usage
//!
//! ```text
//! vaultic do copy nightly        # run action 'copy' against rule 'nightly'
//! vaultic do copy nightly weekly # …against several rules in order
//! vaultic show copy              # doc + property manifest of an action
//! vaultic locate copy            # print the path an action resolves to
//! vaultic create-action copy     # scaffold a runnable action script
//! vaultic create-rule nightly    # scaffold a parseable rule file
//! vaultic --list-actions         # what can run, per search root
//! vaultic --paths                # where files are searched for
//! ```
//!
//! # Module layout
//!
//! | Module               | Responsibility                              |
//! |----------------------|---------------------------------------------|
//! | [`cli`]              | Argument types parsed by clap               |
//! | [`ui`]               | Spinner, outcome lines, run summary         |
//! | [`commands::run`]    | `vaultic do`                                |
//! | [`commands::show`]   | `vaultic show`                              |
//! | [`commands::locate`] | `vaultic locate`                            |
//! | [`commands::create`] | `vaultic create-action` / `create-rule`     |
//! | [`commands::list`]   | Listing flags                               |

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Subcommand};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        // ── vaultic do ────────────────────────────────────────────────────────
        Some(Subcommand::Do { action, rules }) => {
            commands::run::run(action, rules)?;
        },

        // ── vaultic show ──────────────────────────────────────────────────────
        Some(Subcommand::Show { action }) => {
            commands::show::run(action)?;
        },

        // ── vaultic locate ────────────────────────────────────────────────────
        Some(Subcommand::Locate { name, rule }) => {
            commands::locate::run(name, *rule)?;
        },

        // ── vaultic create-action / create-rule ───────────────────────────────
        Some(Subcommand::CreateAction { name, path }) => {
            commands::create::action(name, path.as_ref())?;
        },
        Some(Subcommand::CreateRule { name, path }) => {
            commands::create::rule(name, path.as_ref())?;
        },

        // ── listing flags / bare invocation ───────────────────────────────────
        None => {
            let listed = cli.list_actions || cli.list_rules || cli.paths;
            if cli.list_actions {
                commands::list::print_actions();
            }
            if cli.list_rules {
                commands::list::print_rules();
            }
            if cli.paths {
                commands::list::print_paths();
            }
            if !listed {
                Cli::command().print_help()?;
                std::process::exit(2);
            }
        },
    }

    Ok(())
}
