//! `vaultic show`: describe an action without running it.
//!
//! Prints the action's doc line and its property manifest: one row per
//! property with the declared type, the name, an `[optional]` marker, and
//! the property's own doc.  Types reflect the declared defaults; rules may
//! of course supply something different at run time.

use anyhow::Result;
use console::style;
use vaultic::load_action;

use crate::commands::{action_name, resolve_action};

pub fn run(action_arg: &str) -> Result<()> {
    let script = resolve_action(action_arg)?;
    let name = action_name(action_arg);
    let action = load_action(&script, &name)?;

    println!();
    println!(
        "  {}  {}",
        style(action.name()).bold(),
        style(action.path().display()).dim()
    );

    if !action.doc().is_empty() {
        println!();
        for line in action.doc().lines() {
            println!("  {line}");
        }
    }

    if action.manifest().is_empty() {
        println!();
        println!("  {}", style("(no properties)").dim());
    } else {
        println!();
        for prop in action.manifest() {
            let optional = if prop.is_optional() { " [optional]" } else { "" };
            let doc = if prop.doc().is_empty() {
                String::new()
            } else {
                format!(" -- {}", prop.doc())
            };
            // Pad before styling: escape codes would throw the column off.
            println!(
                "    {}{}{}{}",
                style(format!("{:<8}", prop.property_type())).cyan(),
                style(prop.name()).bold(),
                style(optional).dim(),
                doc
            );
        }
    }
    println!();
    Ok(())
}
