//! `vaultic do`: run one action against one or more rules.
//!
//! # Failure handling
//!
//! | Step                  | On failure                                   |
//! |-----------------------|----------------------------------------------|
//! | resolve the action    | abort before anything runs                   |
//! | resolve one rule      | record the failure, continue with the rest   |
//! | open / load / bind    | abort: the action or rule file is broken     |
//! | run the script        | abort                                        |
//!
//! A missing rule only poisons itself; every other failure stops the run,
//! since a script that just failed half-way is not a safe neighbour for
//! the rules still queued behind it.
//!
//! The action is loaded freshly for every rule, so state a script leaves
//! behind in one run never leaks into the next.  Each rule runs behind a
//! spinner; script output is captured and replayed only on failure.

use std::path::Path;

use anyhow::{Context, Result, bail};
use vaultic::{Rule, load_action, paths};

use crate::{
    commands::{action_name, is_explicit_path, resolve_action, resolve_rule, rule_label},
    ui::{RunOutcome, failed_step, print_summary, run_action},
};

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Execute the action against each rule in order.
///
/// Every rule gets an outcome line and appears in the summary.  The
/// function returns an error if any rule failed.
pub fn run(action_arg: &str, rules: &[String]) -> Result<()> {
    let script = resolve_action(action_arg)?;
    let name = action_name(action_arg);

    println!();
    let mut outcomes: Vec<RunOutcome> = Vec::new();

    for rule_arg in rules {
        let label = rule_label(rule_arg);
        let (outcome, fatal) = run_one(&script, &name, rule_arg, &label);
        outcome.print();
        let failed = outcome.failed();
        outcomes.push(outcome);

        if fatal && failed {
            print_summary(&outcomes);
            bail!("run aborted: rule '{label}' failed");
        }
    }

    let failures = outcomes.iter().filter(|o| o.failed()).count();
    print_summary(&outcomes);
    if failures > 0 {
        bail!("{failures} of {} rule(s) failed", outcomes.len());
    }
    Ok(())
}

// ─── One rule ─────────────────────────────────────────────────────────────────

/// Run one rule, returning its outcome and whether a failure should stop
/// the whole run.
fn run_one(script: &Path, action: &str, rule_arg: &str, label: &str) -> (RunOutcome, bool) {
    let Some(rule_path) = resolve_rule(rule_arg) else {
        let reason = if is_explicit_path(rule_arg, paths::RULE_EXT) {
            format!("rule file not found: {rule_arg}")
        } else {
            format!("no rule named '{rule_arg}' found under the search roots")
        };
        return (failed_step(label, reason), false);
    };

    let bound = Rule::open(&rule_path)
        .with_context(|| format!("cannot use rule '{label}'"))
        .and_then(|rule| {
            load_action(script, action)
                .and_then(|loaded| loaded.instantiate(&rule))
                .with_context(|| format!("cannot bind action '{action}' to rule '{label}'"))
        });

    match bound {
        Ok(ready) => (run_action(label, ready), true),
        Err(e) => (failed_step(label, format!("{e:#}")), true),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
