//! `vaultic locate`: print where a name resolves on disk.
//!
//! Resolves an action name (or a rule name, with `--rule`) through the
//! same root search the other commands use and prints the winning path,
//! nothing else.  A name that resolves nowhere is an error, so shell
//! scripts can test for presence by exit code.

use anyhow::{Context, Result};
use vaultic::paths;

pub fn run(name: &str, rule: bool) -> Result<()> {
    let path = if rule {
        paths::find_rule(name)
            .with_context(|| format!("no rule named '{name}' found under the search roots"))?
    } else {
        paths::find_action(name)
            .with_context(|| format!("no action named '{name}' found under the search roots"))?
    };
    println!("{}", path.display());
    Ok(())
}
